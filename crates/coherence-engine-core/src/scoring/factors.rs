//! The four coherence sub-factors.
//!
//! Each factor lies in [0, 1]. Factors that need history return the neutral
//! value 0.5 until enough samples have been recorded.

use std::f64::consts::TAU;

use crate::constants::history::{
    MIN_COHERENCE_SAMPLES, MIN_FREQUENCY_SAMPLES, MIN_TIMESTAMP_SAMPLES, STATS_WINDOW,
};
use crate::constants::scoring::{
    ALIGNMENT_DECAY, DEVIATION_PENALTY, NEUTRAL_FACTOR, REFERENCE_RATIOS, VARIATION_PENALTY,
};
use crate::history::{mean, population_std_dev, RollingWindow};

/// Frequency stability from the coefficient of variation of recent frequencies.
///
/// ```text
/// cv = σ/μ over the last 20 frequencies (1 when μ = 0)
/// stability = max(0, 1 - 5×cv)
/// ```
pub fn frequency_stability(frequencies: &RollingWindow<f64>) -> f64 {
    if frequencies.len() < MIN_FREQUENCY_SAMPLES {
        return NEUTRAL_FACTOR;
    }

    let recent = frequencies.tail_vec(STATS_WINDOW);
    let mu = mean(&recent);
    let sigma = population_std_dev(&recent, mu);
    let cv = if mu == 0.0 { 1.0 } else { sigma / mu };

    (1.0 - cv * VARIATION_PENALTY).clamp(0.0, 1.0)
}

/// Harmonic alignment of a stack against the reference ratios.
///
/// Each harmonic's ratio to the fundamental is compared to the nearest of
/// {1, φ, φ², 2, 3, 5, 8, 13}; alignment `exp(-2·|ratio - nearest|)` is
/// averaged with weight `1/(i+1)` so lower harmonics dominate. An empty stack
/// scores 0.
pub fn harmonic_alignment(harmonics: &[f64]) -> f64 {
    let Some(&fundamental) = harmonics.first() else {
        return 0.0;
    };

    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for (i, &harmonic) in harmonics.iter().enumerate() {
        let ratio = if fundamental == 0.0 {
            0.0
        } else {
            harmonic / fundamental
        };
        let distance = (ratio - closest_reference(ratio)).abs();
        let alignment = (-ALIGNMENT_DECAY * distance).exp();
        let weight = 1.0 / (i as f64 + 1.0);

        weighted += alignment * weight;
        total_weight += weight;
    }

    (weighted / total_weight).clamp(0.0, 1.0)
}

/// Nearest reference ratio to `ratio`.
pub fn closest_reference(ratio: f64) -> f64 {
    REFERENCE_RATIOS
        .iter()
        .copied()
        .min_by(|a, b| (a - ratio).abs().total_cmp(&(b - ratio).abs()))
        .unwrap_or(1.0)
}

/// Consistency of the recorded coherence scores.
///
/// Despite the name this reads the coherence-score history, not amplitudes.
///
/// ```text
/// consistency = max(0, 1 - 2×σ) over the last 20 scores
/// ```
pub fn amplitude_consistency(coherence_scores: &RollingWindow<f64>) -> f64 {
    if coherence_scores.len() < MIN_COHERENCE_SAMPLES {
        return NEUTRAL_FACTOR;
    }

    let recent = coherence_scores.tail_vec(STATS_WINDOW);
    let sigma = population_std_dev(&recent, mean(&recent));

    (1.0 - sigma * DEVIATION_PENALTY).clamp(0.0, 1.0)
}

/// Phase coherence of the current phase.
///
/// Only the presence of history is checked; historical phases are not used.
///
/// ```text
/// fraction = (phase mod 2π) / 2π
/// coherence = cos(2π×fraction)×0.5 + 0.5
/// ```
pub fn phase_coherence(phase: f64, timestamps: &RollingWindow<f64>) -> f64 {
    if timestamps.len() < MIN_TIMESTAMP_SAMPLES {
        return NEUTRAL_FACTOR;
    }

    let fraction = phase.rem_euclid(TAU) / TAU;
    ((fraction * TAU).cos() * 0.5 + 0.5).clamp(0.0, 1.0)
}
