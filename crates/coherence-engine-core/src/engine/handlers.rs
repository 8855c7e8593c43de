//! Inbound event handlers.

use super::{EngineInner, IngestOutcome};
use crate::error::{CoherenceError, CoherenceResult};
use crate::persistence::CoherenceRecord;
use crate::types::{
    BridgeEvent, BridgeReadyEvent, CoherenceRequestEvent, CoherenceResponseEvent, EventKind,
    HarmonicDataEvent, HarmonicMode, SessionEndEvent, SessionStartEvent, UserStateEvent,
};

impl EngineInner {
    pub(crate) fn handle_event(&self, event: &BridgeEvent) -> CoherenceResult<()> {
        match event {
            BridgeEvent::HarmonicData(data) => self.ingest(data).map(|_| ()),
            BridgeEvent::BridgeConnected(detail) => {
                self.on_bridge_connected(detail);
                Ok(())
            }
            BridgeEvent::BridgeDisconnected(detail) => {
                self.on_bridge_disconnected(detail);
                Ok(())
            }
            BridgeEvent::UserState(state) => {
                self.on_user_state(state);
                Ok(())
            }
            BridgeEvent::CoherenceRequest(request) => {
                self.on_coherence_request(request);
                Ok(())
            }
            BridgeEvent::SessionStart(start) => {
                self.on_session_start(start);
                Ok(())
            }
            BridgeEvent::SessionEnd(end) => {
                self.on_session_end(end);
                Ok(())
            }
            BridgeEvent::BridgeReady(_)
            | BridgeEvent::CoherenceUpdate(_)
            | BridgeEvent::CoherenceResponse(_) => {
                tracing::trace!(kind = %event.kind(), "Ignoring outbound event");
                Ok(())
            }
        }
    }

    /// Harmonic-data path.
    ///
    /// 1. Reject events without a user id or with non-finite sample fields
    /// 2. Record the sample, then score it (the scorer records it again)
    /// 3. In collective mode, fold the user's score into the group
    /// 4. If the throttle allows, publish feedback and enqueue persistence
    ///
    /// The lock is released before publishing.
    pub(crate) fn ingest(&self, data: &HarmonicDataEvent) -> CoherenceResult<IngestOutcome> {
        let user_id = data
            .user_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                CoherenceError::missing_identifier(EventKind::HarmonicData.as_str(), "userId")
            })?;
        let sample = &data.sonic_data;
        sample.validate()?;

        let now_ms = self.clock.now_ms();
        let interval_ms = self.config.engine.feedback_interval_ms;

        let (breakdown, collective_score, published, session_id) = {
            let mut guard = self.state.lock();
            let state = &mut *guard;

            state.history.record(user_id, sample);
            let breakdown = state.scorer.score(sample, user_id, &mut state.history);

            let collective_score = match data.mode {
                HarmonicMode::Collective => {
                    state.collective.update(user_id, breakdown.score());
                    Some(state.collective.aggregate())
                }
                HarmonicMode::Individual => None,
            };

            let published = if state.try_claim_feedback(now_ms, interval_ms) {
                let value = collective_score.unwrap_or_else(|| breakdown.score());
                Some(self.feedback.generate(value))
            } else {
                None
            };

            let session_id = data
                .session_id
                .clone()
                .or_else(|| state.session_id.clone());

            (breakdown, collective_score, published, session_id)
        };

        tracing::debug!(
            user_id = %user_id,
            score = breakdown.score(),
            collective = ?collective_score,
            emitted = published.is_some(),
            "Harmonic sample scored"
        );

        if let Some(feedback) = &published {
            self.bus.publish(&BridgeEvent::CoherenceUpdate(feedback.clone()));

            let record =
                CoherenceRecord::new(user_id, session_id, sample.clone(), breakdown.score());
            if let Err(e) = self.writer.enqueue(record) {
                tracing::warn!(user_id = %user_id, error = %e, "Coherence sample not persisted");
            }
        }

        Ok(IngestOutcome {
            user_id: user_id.to_string(),
            breakdown,
            collective_score,
            published,
        })
    }

    fn on_bridge_connected(&self, detail: &serde_json::Value) {
        tracing::info!(detail = %detail, "Bridge connected");
        self.bus.publish(&BridgeEvent::BridgeReady(BridgeReadyEvent {
            status: "ready".to_string(),
            capabilities: self.config.engine.capabilities.clone(),
        }));
    }

    fn on_bridge_disconnected(&self, detail: &serde_json::Value) {
        let mut state = self.state.lock();
        let users = state.history.user_count();
        state.history.clear_all();
        state.collective.clear();
        tracing::info!(
            detail = %detail,
            cleared_users = users,
            "Bridge disconnected, history reset"
        );
    }

    fn on_user_state(&self, event: &UserStateEvent) {
        tracing::debug!(
            user_id = %event.user_id,
            intention = ?event.intention,
            emotional_state = ?event.emotional_state,
            "User state received"
        );
    }

    fn on_coherence_request(&self, request: &CoherenceRequestEvent) {
        let summary = {
            let state = self.state.lock();
            state
                .history
                .get(&request.user_id)
                .and_then(|history| history.coherence_summary())
        };

        let Some(summary) = summary else {
            tracing::debug!(user_id = %request.user_id, "No history for coherence request");
            return;
        };

        self.bus
            .publish(&BridgeEvent::CoherenceResponse(CoherenceResponseEvent {
                user_id: request.user_id.clone(),
                coherence_index: summary.avg,
                historical_data: summary,
            }));
    }

    fn on_session_start(&self, event: &SessionStartEvent) {
        let mut state = self.state.lock();
        state.session_id = Some(event.session_id.clone());
        if let Some(user_id) = event.user_id.as_deref().filter(|id| !id.is_empty()) {
            state.history.reset(user_id);
        }
        tracing::info!(
            session_id = %event.session_id,
            user_id = ?event.user_id,
            "Session started"
        );
    }

    // Per-user history survives the end of a session; only a bridge
    // disconnect clears it.
    fn on_session_end(&self, event: &SessionEndEvent) {
        let previous = self.state.lock().session_id.take();
        if previous.as_deref() != Some(event.session_id.as_str()) {
            tracing::debug!(
                ended = %event.session_id,
                current = ?previous,
                "Session end for a non-current session"
            );
        }
        tracing::info!(session_id = %event.session_id, "Session ended");
    }
}
