//! Coherence scoring.
//!
//! ```text
//! raw      = 0.30×stability + 0.35×alignment + 0.20×amplitude + 0.15×phase
//! smoothed = 0.3×raw + 0.7×smoothed_prev
//! ```

mod factors;
mod scorer;

pub use factors::{
    amplitude_consistency, closest_reference, frequency_stability, harmonic_alignment,
    phase_coherence,
};
pub use scorer::{combine_factors, CoherenceBreakdown, CoherenceScorer};
