//! Fixed constants of the coherence model.
//!
//! Factor weights, reference ratios and feedback thresholds are part of the
//! scoring contract and are not configurable. Operational knobs (window size,
//! throttle interval, queue bound) live in [`crate::config`].

/// History window constants.
pub mod history {
    /// Default per-user window length for each of the four parallel sequences.
    pub const DEFAULT_WINDOW: usize = 100;

    /// Number of most recent entries considered by stability statistics.
    pub const STATS_WINDOW: usize = 20;

    /// Minimum recorded frequencies before frequency stability is computed.
    pub const MIN_FREQUENCY_SAMPLES: usize = 5;

    /// Minimum recorded coherence scores before amplitude consistency is computed.
    pub const MIN_COHERENCE_SAMPLES: usize = 5;

    /// Minimum recorded timestamps before phase coherence is computed.
    pub const MIN_TIMESTAMP_SAMPLES: usize = 2;
}

/// Four-factor coherence weights and smoothing.
///
/// ```text
/// raw = 0.30×stability + 0.35×alignment + 0.20×amplitude + 0.15×phase
/// smoothed = 0.3×raw + 0.7×smoothed_prev
/// ```
pub mod scoring {
    /// Weight of frequency stability.
    pub const STABILITY_WEIGHT: f64 = 0.30;

    /// Weight of harmonic alignment.
    pub const ALIGNMENT_WEIGHT: f64 = 0.35;

    /// Weight of amplitude consistency.
    pub const AMPLITUDE_WEIGHT: f64 = 0.20;

    /// Weight of phase coherence.
    pub const PHASE_WEIGHT: f64 = 0.15;

    /// EMA weight given to the newest raw score.
    pub const SMOOTHING_ALPHA: f64 = 0.3;

    /// Initial value of the engine-wide smoothed state.
    pub const INITIAL_SMOOTHED: f64 = 0.5;

    /// Value returned by a sub-factor that lacks enough history.
    pub const NEUTRAL_FACTOR: f64 = 0.5;

    /// Coefficient-of-variation multiplier for frequency stability.
    pub const VARIATION_PENALTY: f64 = 5.0;

    /// Standard-deviation multiplier for amplitude consistency.
    pub const DEVIATION_PENALTY: f64 = 2.0;

    /// Decay rate of harmonic alignment with distance to the nearest reference.
    pub const ALIGNMENT_DECAY: f64 = 2.0;

    /// Golden ratio φ.
    pub const PHI: f64 = 1.618033988749895;

    /// Reference harmonic ratios: {1, φ, φ², 2, 3, 5, 8, 13}.
    pub const REFERENCE_RATIOS: [f64; 8] = [1.0, PHI, PHI * PHI, 2.0, 3.0, 5.0, 8.0, 13.0];
}

/// Collective aggregation.
///
/// ```text
/// sync = max(0, 1 - 2×variance)
/// group = 0.7×mean + 0.3×sync
/// ```
pub mod collective {
    /// Group score when no user has been scored.
    pub const EMPTY_GROUP_SCORE: f64 = 0.5;

    /// Weight of the mean per-user score.
    pub const MEAN_WEIGHT: f64 = 0.7;

    /// Weight of the synchronization term.
    pub const SYNC_WEIGHT: f64 = 0.3;

    /// Variance multiplier for the synchronization term.
    pub const VARIANCE_PENALTY: f64 = 2.0;
}

/// Feedback policy thresholds.
pub mod feedback {
    /// Default minimum spacing between feedback emissions.
    pub const DEFAULT_INTERVAL_MS: u64 = 3000;

    /// Above this coherence the gain is boosted.
    pub const HIGH_GAIN_THRESHOLD: f64 = 0.8;

    /// Below this coherence the gain is damped.
    pub const LOW_GAIN_THRESHOLD: f64 = 0.4;

    /// Above this coherence no phase correction is applied.
    pub const PHASE_LOCK_THRESHOLD: f64 = 0.7;
}
