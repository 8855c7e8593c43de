//! CoherenceEngine - orchestrator wiring the scoring pipeline to the bus.
//!
//! # Module Organization
//!
//! - `mod.rs` (this file): struct definition, construction, lifecycle, status
//! - `handlers.rs`: per-event handlers and the harmonic-data path
//! - `state.rs`: mutable state guarded by the engine lock
//!
//! # Lifecycle
//!
//! ```text
//! Idle --start()--> Listening --stop()--> Idle
//! NoSession --session-start--> InSession --session-end--> NoSession
//! ```
//!
//! Handlers registered on the bus hold a weak reference to the engine, so
//! the bus never keeps a dropped engine alive. The engine lock is released
//! before anything is published, which lets subscribers publish back into
//! the bus from inside their handlers.

mod handlers;
mod state;


use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::bus::{EventBus, EventHandler, Subscription};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::CoherenceResult;
use crate::feedback::{CoherenceFeedback, FeedbackGenerator};
use crate::persistence::{CoherenceRecord, HistoryStore, PersistenceStats, PersistenceWriter};
use crate::scoring::CoherenceBreakdown;
use crate::types::{BridgeEvent, EventKind, HarmonicDataEvent};

use state::EngineState;

/// Result of ingesting one harmonic-data event.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    pub user_id: String,
    /// Per-user score and its components
    pub breakdown: CoherenceBreakdown,
    /// Group score, present in collective mode
    pub collective_score: Option<f64>,
    /// Feedback published for this event, if the throttle allowed it
    pub published: Option<CoherenceFeedback>,
}

/// Point-in-time view of the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub listening: bool,
    pub session_id: Option<String>,
    pub tracked_users: usize,
    pub collective_users: usize,
    pub smoothed_coherence: f64,
    pub last_feedback_ms: Option<u64>,
    pub persistence: PersistenceStats,
}

pub(crate) struct EngineInner {
    config: Config,
    bus: Arc<dyn EventBus>,
    clock: Arc<dyn Clock>,
    store: Arc<dyn HistoryStore>,
    writer: PersistenceWriter,
    feedback: FeedbackGenerator,
    state: Mutex<EngineState>,
    subscriptions: Mutex<Vec<Subscription>>,
}

/// Coherence engine.
///
/// Owns per-user history, the shared smoothed score, collective state and
/// the feedback throttle. Must be constructed inside a Tokio runtime, which
/// hosts the persistence worker.
///
/// # Example
///
/// ```rust,ignore
/// let bus = Arc::new(InMemoryEventBus::new());
/// let store = Arc::new(InMemoryHistoryStore::new());
/// let engine = CoherenceEngine::new(Config::default(), bus.clone(), store)?;
/// engine.start();
/// bus.publish(&BridgeEvent::HarmonicData(HarmonicDataEvent::new("u1", sample)));
/// engine.shutdown().await;
/// ```
pub struct CoherenceEngine {
    inner: Arc<EngineInner>,
}

impl std::fmt::Debug for CoherenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoherenceEngine")
            .field("status", &self.status())
            .finish()
    }
}

impl CoherenceEngine {
    /// Create an engine driven by the wall clock.
    ///
    /// # Errors
    ///
    /// - `ConfigError` if `config` fails validation
    /// - `RuntimeUnavailable` outside a Tokio runtime
    pub fn new(
        config: Config,
        bus: Arc<dyn EventBus>,
        store: Arc<dyn HistoryStore>,
    ) -> CoherenceResult<Self> {
        Self::with_clock(config, bus, store, Arc::new(SystemClock))
    }

    /// Create an engine with an explicit clock for the feedback throttle.
    pub fn with_clock(
        config: Config,
        bus: Arc<dyn EventBus>,
        store: Arc<dyn HistoryStore>,
        clock: Arc<dyn Clock>,
    ) -> CoherenceResult<Self> {
        config.validate()?;

        let writer =
            PersistenceWriter::spawn(Arc::clone(&store), config.persistence.queue_capacity)?;
        let state = EngineState::new(config.engine.history_window);

        tracing::info!(
            history_window = config.engine.history_window,
            feedback_interval_ms = config.engine.feedback_interval_ms,
            queue_capacity = config.persistence.queue_capacity,
            "CoherenceEngine initialized"
        );

        Ok(Self {
            inner: Arc::new(EngineInner {
                config,
                bus,
                clock,
                store,
                writer,
                feedback: FeedbackGenerator::new(),
                state: Mutex::new(state),
                subscriptions: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Subscribe to every inbound event kind. No-op while listening.
    pub fn start(&self) {
        let mut subscriptions = self.inner.subscriptions.lock();
        if !subscriptions.is_empty() {
            tracing::debug!("CoherenceEngine already listening");
            return;
        }

        for kind in EventKind::INBOUND {
            let weak = Arc::downgrade(&self.inner);
            let handler: EventHandler = Arc::new(move |event: &BridgeEvent| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                if let Err(e) = inner.handle_event(event) {
                    tracing::warn!(kind = %event.kind(), error = %e, "Dropped inbound event");
                }
            });
            subscriptions.push(self.inner.bus.subscribe(kind, handler));
        }

        tracing::info!(kinds = subscriptions.len(), "CoherenceEngine listening");
    }

    /// Unsubscribe every handler. No-op while idle.
    pub fn stop(&self) {
        self.inner.stop();
    }

    pub fn is_listening(&self) -> bool {
        !self.inner.subscriptions.lock().is_empty()
    }

    /// Route one event to its handler. Outbound kinds are ignored.
    ///
    /// # Errors
    ///
    /// Malformed input (`MissingIdentifier`, `InvalidSample`). State is left
    /// untouched in that case.
    pub fn handle_event(&self, event: &BridgeEvent) -> CoherenceResult<()> {
        self.inner.handle_event(event)
    }

    /// Run the harmonic-data path for one event.
    pub fn ingest(&self, event: &HarmonicDataEvent) -> CoherenceResult<IngestOutcome> {
        self.inner.ingest(event)
    }

    /// Generate and publish feedback for `coherence` directly.
    ///
    /// Bypasses ingestion and does not touch the throttle.
    pub fn send_feedback(&self, coherence: f64) -> CoherenceFeedback {
        let feedback = self.inner.feedback.generate(coherence);
        self.inner
            .bus
            .publish(&BridgeEvent::CoherenceUpdate(feedback.clone()));
        feedback
    }

    /// Persisted records for `user_id`, most recent first.
    ///
    /// Store failures are logged and resolve to an empty list.
    pub async fn load_history(&self, user_id: &str) -> Vec<CoherenceRecord> {
        let limit = self.inner.config.persistence.query_limit;
        match self.inner.store.query(user_id, limit).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to load history");
                Vec::new()
            }
        }
    }

    pub fn status(&self) -> EngineStatus {
        let listening = self.is_listening();
        let state = self.inner.state.lock();
        EngineStatus {
            listening,
            session_id: state.session_id.clone(),
            tracked_users: state.history.user_count(),
            collective_users: state.collective.len(),
            smoothed_coherence: state.scorer.smoothed(),
            last_feedback_ms: state.last_feedback_ms,
            persistence: self.inner.writer.stats(),
        }
    }

    /// Stop listening, then wait for queued persistence writes.
    pub async fn shutdown(&self) {
        self.inner.stop();
        self.inner.writer.close().await;
        tracing::info!(stats = ?self.inner.writer.stats(), "CoherenceEngine shut down");
    }
}

impl Drop for CoherenceEngine {
    fn drop(&mut self) {
        self.inner.stop();
    }
}

impl EngineInner {
    fn stop(&self) {
        let subscriptions = std::mem::take(&mut *self.subscriptions.lock());
        if subscriptions.is_empty() {
            return;
        }
        for subscription in &subscriptions {
            self.bus.unsubscribe(subscription);
        }
        tracing::info!(kinds = subscriptions.len(), "CoherenceEngine stopped listening");
    }
}
