//! Per-user sliding history of recent samples.

use std::collections::HashMap;

use super::window::RollingWindow;
use crate::constants::history::DEFAULT_WINDOW;
use crate::scoring::harmonic_alignment;
use crate::types::{HarmonicSample, HistoricalSummary};

/// Four parallel bounded sequences for one user.
///
/// The sequences are only ever pushed together, so they always have equal
/// length.
#[derive(Debug, Clone)]
pub struct UserHistory {
    frequencies: RollingWindow<f64>,
    coherence_scores: RollingWindow<f64>,
    timestamps: RollingWindow<f64>,
    harmonic_alignments: RollingWindow<f64>,
}

impl UserHistory {
    pub fn new(window: usize) -> Self {
        Self {
            frequencies: RollingWindow::new(window),
            coherence_scores: RollingWindow::new(window),
            timestamps: RollingWindow::new(window),
            harmonic_alignments: RollingWindow::new(window),
        }
    }

    fn push(&mut self, sample: &HarmonicSample) {
        self.frequencies.push(sample.frequency);
        self.coherence_scores.push(sample.coherence);
        self.timestamps.push(sample.timestamp);
        self.harmonic_alignments.push(harmonic_alignment(&sample.harmonics));
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn frequencies(&self) -> &RollingWindow<f64> {
        &self.frequencies
    }

    pub fn coherence_scores(&self) -> &RollingWindow<f64> {
        &self.coherence_scores
    }

    pub fn timestamps(&self) -> &RollingWindow<f64> {
        &self.timestamps
    }

    pub fn harmonic_alignments(&self) -> &RollingWindow<f64> {
        &self.harmonic_alignments
    }

    /// Count, min, max and mean of the recorded coherence scores.
    ///
    /// `None` when nothing has been recorded.
    pub fn coherence_summary(&self) -> Option<HistoricalSummary> {
        let scores = &self.coherence_scores;
        Some(HistoricalSummary {
            count: scores.len(),
            min: scores.min()?,
            max: scores.max()?,
            avg: scores.average()?,
        })
    }
}

/// Sliding history for every tracked user.
///
/// Not synchronized; the engine guards it together with the rest of its
/// mutable state.
#[derive(Debug, Clone)]
pub struct SlidingHistoryStore {
    users: HashMap<String, UserHistory>,
    window: usize,
}

impl Default for SlidingHistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl SlidingHistoryStore {
    pub fn new(window: usize) -> Self {
        Self {
            users: HashMap::new(),
            window,
        }
    }

    /// Append a sample to the user's history, creating it on first use.
    pub fn record(&mut self, user_id: &str, sample: &HarmonicSample) {
        let window = self.window;
        self.users
            .entry(user_id.to_string())
            .or_insert_with(|| UserHistory::new(window))
            .push(sample);
    }

    pub fn get(&self, user_id: &str) -> Option<&UserHistory> {
        self.users.get(user_id)
    }

    /// Replace the user's history with an empty one.
    pub fn reset(&mut self, user_id: &str) {
        self.users
            .insert(user_id.to_string(), UserHistory::new(self.window));
    }

    pub fn clear_all(&mut self) {
        self.users.clear();
    }

    /// Number of users with a history entry (possibly empty).
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn window(&self) -> usize {
        self.window
    }
}
