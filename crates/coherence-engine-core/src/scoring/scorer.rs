//! Four-factor coherence scorer with engine-wide EMA smoothing.

use serde::{Deserialize, Serialize};

use super::factors::{
    amplitude_consistency, frequency_stability, harmonic_alignment, phase_coherence,
};
use crate::constants::scoring::{
    ALIGNMENT_WEIGHT, AMPLITUDE_WEIGHT, INITIAL_SMOOTHED, NEUTRAL_FACTOR, PHASE_WEIGHT,
    SMOOTHING_ALPHA, STABILITY_WEIGHT,
};
use crate::feedback::clamp_unit;
use crate::history::SlidingHistoryStore;
use crate::types::HarmonicSample;

/// Result of one scoring call with every component exposed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoherenceBreakdown {
    pub frequency_stability: f64,
    pub harmonic_alignment: f64,
    pub amplitude_consistency: f64,
    pub phase_coherence: f64,
    /// Weighted combination before smoothing
    pub raw: f64,
    /// Smoothed score in [0, 1]; also the scorer's new state
    pub smoothed: f64,
}

impl CoherenceBreakdown {
    /// The published score.
    pub fn score(&self) -> f64 {
        self.smoothed
    }
}

/// Weighted combination of the four factors.
///
/// ```text
/// raw = 0.30×stability + 0.35×alignment + 0.20×amplitude + 0.15×phase
/// ```
pub fn combine_factors(stability: f64, alignment: f64, amplitude: f64, phase: f64) -> f64 {
    STABILITY_WEIGHT * stability
        + ALIGNMENT_WEIGHT * alignment
        + AMPLITUDE_WEIGHT * amplitude
        + PHASE_WEIGHT * phase
}

/// Coherence scorer.
///
/// Holds a single smoothed value shared by every user scored through it, so
/// interleaved users pull one another's smoothed score. The value starts at
/// 0.5 and always stays in [0, 1].
#[derive(Debug, Clone)]
pub struct CoherenceScorer {
    smoothed: f64,
}

impl Default for CoherenceScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl CoherenceScorer {
    pub fn new() -> Self {
        Self {
            smoothed: INITIAL_SMOOTHED,
        }
    }

    /// Current smoothed state.
    pub fn smoothed(&self) -> f64 {
        self.smoothed
    }

    /// Score a sample for `user_id`.
    ///
    /// Records the sample into `history` first, so the sample is part of its
    /// own stability and consistency windows.
    pub fn score(
        &mut self,
        sample: &HarmonicSample,
        user_id: &str,
        history: &mut SlidingHistoryStore,
    ) -> CoherenceBreakdown {
        history.record(user_id, sample);

        let alignment = harmonic_alignment(&sample.harmonics);
        let (stability, amplitude, phase) = match history.get(user_id) {
            Some(h) => (
                frequency_stability(h.frequencies()),
                amplitude_consistency(h.coherence_scores()),
                phase_coherence(sample.phase, h.timestamps()),
            ),
            None => (NEUTRAL_FACTOR, NEUTRAL_FACTOR, NEUTRAL_FACTOR),
        };

        let raw = combine_factors(stability, alignment, amplitude, phase);
        let smoothed = self.smooth(raw);

        tracing::trace!(
            user_id = %user_id,
            stability = %stability,
            alignment = %alignment,
            amplitude = %amplitude,
            phase = %phase,
            raw = %raw,
            smoothed = %smoothed,
            "Coherence factors computed"
        );

        CoherenceBreakdown {
            frequency_stability: stability,
            harmonic_alignment: alignment,
            amplitude_consistency: amplitude,
            phase_coherence: phase,
            raw,
            smoothed,
        }
    }

    /// Fold a raw score into the smoothed state and return the new state.
    ///
    /// ```text
    /// smoothed = clamp(0.3×raw + 0.7×smoothed_prev, 0, 1)
    /// ```
    pub fn smooth(&mut self, raw: f64) -> f64 {
        let next = SMOOTHING_ALPHA * raw + (1.0 - SMOOTHING_ALPHA) * self.smoothed;
        self.smoothed = clamp_unit(next);
        self.smoothed
    }

    /// Return the smoothed state to its initial value.
    pub fn reset(&mut self) {
        self.smoothed = INITIAL_SMOOTHED;
    }
}
