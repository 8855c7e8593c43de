//! Bridge events exchanged over the event bus.
//!
//! On the wire each event is `{"type": "<kebab-name>", "detail": {...}}` with
//! camelCase payload fields.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::sample::HarmonicSample;
use crate::feedback::CoherenceFeedback;

/// Scoring mode requested by a harmonic-data event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HarmonicMode {
    #[default]
    Individual,
    Collective,
}

/// Payload of `harmonic-data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarmonicDataEvent {
    pub sonic_data: HarmonicSample,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub mode: HarmonicMode,
}

impl HarmonicDataEvent {
    pub fn new(user_id: impl Into<String>, sample: HarmonicSample) -> Self {
        Self {
            sonic_data: sample,
            user_id: Some(user_id.into()),
            session_id: None,
            mode: HarmonicMode::Individual,
        }
    }

    pub fn collective(mut self) -> Self {
        self.mode = HarmonicMode::Collective;
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Payload of `user-state`. Logged only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStateEvent {
    pub user_id: String,
    #[serde(default)]
    pub intention: Option<String>,
    #[serde(default)]
    pub emotional_state: Option<String>,
}

/// Payload of `coherence-request`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoherenceRequestEvent {
    pub user_id: String,
}

/// Payload of `session-start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStartEvent {
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Payload of `session-end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEndEvent {
    pub session_id: String,
}

/// Payload of `bridge-ready`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeReadyEvent {
    pub status: String,
    pub capabilities: Vec<String>,
}

/// Summary statistics of a user's recorded coherence scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

/// Payload of `coherence-response`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoherenceResponseEvent {
    pub user_id: String,
    pub coherence_index: f64,
    pub historical_data: HistoricalSummary,
}

/// Every event the engine consumes or publishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "kebab-case")]
pub enum BridgeEvent {
    // inbound
    HarmonicData(HarmonicDataEvent),
    BridgeConnected(serde_json::Value),
    BridgeDisconnected(serde_json::Value),
    UserState(UserStateEvent),
    CoherenceRequest(CoherenceRequestEvent),
    SessionStart(SessionStartEvent),
    SessionEnd(SessionEndEvent),
    // outbound
    BridgeReady(BridgeReadyEvent),
    CoherenceUpdate(CoherenceFeedback),
    CoherenceResponse(CoherenceResponseEvent),
}

impl BridgeEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::HarmonicData(_) => EventKind::HarmonicData,
            Self::BridgeConnected(_) => EventKind::BridgeConnected,
            Self::BridgeDisconnected(_) => EventKind::BridgeDisconnected,
            Self::UserState(_) => EventKind::UserState,
            Self::CoherenceRequest(_) => EventKind::CoherenceRequest,
            Self::SessionStart(_) => EventKind::SessionStart,
            Self::SessionEnd(_) => EventKind::SessionEnd,
            Self::BridgeReady(_) => EventKind::BridgeReady,
            Self::CoherenceUpdate(_) => EventKind::CoherenceUpdate,
            Self::CoherenceResponse(_) => EventKind::CoherenceResponse,
        }
    }
}

/// Event name used for subscription routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    HarmonicData,
    BridgeConnected,
    BridgeDisconnected,
    UserState,
    CoherenceRequest,
    SessionStart,
    SessionEnd,
    BridgeReady,
    CoherenceUpdate,
    CoherenceResponse,
}

impl EventKind {
    /// Kinds the engine subscribes to while listening.
    pub const INBOUND: [EventKind; 7] = [
        EventKind::HarmonicData,
        EventKind::BridgeConnected,
        EventKind::BridgeDisconnected,
        EventKind::UserState,
        EventKind::CoherenceRequest,
        EventKind::SessionStart,
        EventKind::SessionEnd,
    ];

    /// Kinds the engine publishes.
    pub const OUTBOUND: [EventKind; 3] = [
        EventKind::BridgeReady,
        EventKind::CoherenceUpdate,
        EventKind::CoherenceResponse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HarmonicData => "harmonic-data",
            Self::BridgeConnected => "bridge-connected",
            Self::BridgeDisconnected => "bridge-disconnected",
            Self::UserState => "user-state",
            Self::CoherenceRequest => "coherence-request",
            Self::SessionStart => "session-start",
            Self::SessionEnd => "session-end",
            Self::BridgeReady => "bridge-ready",
            Self::CoherenceUpdate => "coherence-update",
            Self::CoherenceResponse => "coherence-response",
        }
    }

    pub fn is_inbound(&self) -> bool {
        Self::INBOUND.contains(self)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
