//! Collective mode: fusing per-user scores into one group score.
//!
//! ```text
//! μ = mean(scores), σ² = population variance
//! sync  = max(0, 1 - 2σ²)
//! group = clamp(0.7μ + 0.3×sync, 0, 1)
//! ```

use std::collections::HashMap;

use crate::constants::collective::{EMPTY_GROUP_SCORE, MEAN_WEIGHT, SYNC_WEIGHT, VARIANCE_PENALTY};
use crate::feedback::clamp_unit;
use crate::history::{mean, population_variance};

/// Aggregate a set of per-user scores. Empty input yields 0.5.
pub fn aggregate(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return EMPTY_GROUP_SCORE;
    }

    let mu = mean(scores);
    let variance = population_variance(scores, mu);
    let sync = (1.0 - variance * VARIANCE_PENALTY).max(0.0);

    clamp_unit(mu * MEAN_WEIGHT + sync * SYNC_WEIGHT)
}

/// Latest coherence per user in collective mode.
///
/// Entries are overwritten, never appended, so size is bounded by the number
/// of concurrently active users.
#[derive(Debug, Clone, Default)]
pub struct CollectiveState {
    latest: HashMap<String, f64>,
}

impl CollectiveState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, user_id: &str, score: f64) {
        self.latest.insert(user_id.to_string(), score);
    }

    pub fn get(&self, user_id: &str) -> Option<f64> {
        self.latest.get(user_id).copied()
    }

    /// Group score over every user's latest value.
    pub fn aggregate(&self) -> f64 {
        let scores: Vec<f64> = self.latest.values().copied().collect();
        aggregate(&scores)
    }

    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }

    pub fn clear(&mut self) {
        self.latest.clear();
    }
}
