//! Mutable engine state guarded by a single lock.

use crate::collective::CollectiveState;
use crate::history::SlidingHistoryStore;
use crate::scoring::CoherenceScorer;

/// Everything the handlers mutate.
///
/// History, collective map, smoothed scalar and throttle timestamp live
/// behind one mutex so a scoring call observes and updates them atomically.
#[derive(Debug)]
pub(crate) struct EngineState {
    pub(crate) history: SlidingHistoryStore,
    pub(crate) collective: CollectiveState,
    pub(crate) scorer: CoherenceScorer,
    pub(crate) last_feedback_ms: Option<u64>,
    pub(crate) session_id: Option<String>,
}

impl EngineState {
    pub(crate) fn new(history_window: usize) -> Self {
        Self {
            history: SlidingHistoryStore::new(history_window),
            collective: CollectiveState::new(),
            scorer: CoherenceScorer::new(),
            last_feedback_ms: None,
            session_id: None,
        }
    }

    /// Claim the feedback slot at `now_ms` if the interval has elapsed.
    ///
    /// Returns `true` and stamps the throttle when emission is allowed.
    pub(crate) fn try_claim_feedback(&mut self, now_ms: u64, interval_ms: u64) -> bool {
        let due = match self.last_feedback_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= interval_ms,
        };
        if due {
            self.last_feedback_ms = Some(now_ms);
        }
        due
    }
}
