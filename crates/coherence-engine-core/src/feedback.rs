//! Feedback policy: coherence → gain, phase correction and recommendation.
//!
//! ```text
//! gain  = 1.0 + (c-0.8)×2.5   if c > 0.8
//!       = 0.5 + c×0.75        if c < 0.4
//!       = 0.8 + c×0.4         otherwise
//! phase = 0                   if c > 0.7
//!       = (0.7-c)×π/4         otherwise
//! ```
//!
//! The gain curve is discontinuous at 0.4 and 0.8; the steps are part of the
//! policy.

use std::f64::consts::FRAC_PI_4;

use serde::{Deserialize, Serialize};

use crate::constants::feedback::{HIGH_GAIN_THRESHOLD, LOW_GAIN_THRESHOLD, PHASE_LOCK_THRESHOLD};

/// Feedback signal published as `coherence-update`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoherenceFeedback {
    /// Coherence index in [0, 1]
    pub coherence_index: f64,
    /// Gain modulation factor (> 0)
    pub gain_modulation: f64,
    /// Phase shift correction in radians
    pub phase_shift: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

/// Recommendation tier, first match in descending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationTier {
    /// c > 0.85
    Excellent,
    /// c > 0.7
    Good,
    /// c > 0.5
    Moderate,
    /// c > 0.3
    Low,
    /// otherwise
    VeryLow,
}

impl RecommendationTier {
    pub fn from_coherence(coherence: f64) -> Self {
        if coherence > 0.85 {
            Self::Excellent
        } else if coherence > 0.7 {
            Self::Good
        } else if coherence > 0.5 {
            Self::Moderate
        } else if coherence > 0.3 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent coherence - maintain this state",
            Self::Good => "Good coherence - deepen your focus",
            Self::Moderate => "Moderate coherence - relax and breathe",
            Self::Low => "Low coherence - try slowing your breath",
            Self::VeryLow => "Very low coherence - take a moment to center",
        }
    }
}

/// Stateless feedback generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedbackGenerator;

impl FeedbackGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Map a coherence value to a feedback signal.
    ///
    /// The input is clamped to [0, 1] first so the published index and the
    /// derived gain stay within their documented ranges.
    pub fn generate(&self, coherence: f64) -> CoherenceFeedback {
        let coherence = clamp_unit(coherence);
        CoherenceFeedback {
            coherence_index: coherence,
            gain_modulation: gain_modulation(coherence),
            phase_shift: phase_shift(coherence),
            recommendation: Some(
                RecommendationTier::from_coherence(coherence)
                    .message()
                    .to_string(),
            ),
        }
    }
}

/// Gain modulation factor for a coherence value.
pub fn gain_modulation(coherence: f64) -> f64 {
    if coherence > HIGH_GAIN_THRESHOLD {
        1.0 + (coherence - HIGH_GAIN_THRESHOLD) * 2.5
    } else if coherence < LOW_GAIN_THRESHOLD {
        0.5 + coherence * 0.75
    } else {
        0.8 + coherence * 0.4
    }
}

/// Phase shift correction for a coherence value.
pub fn phase_shift(coherence: f64) -> f64 {
    if coherence > PHASE_LOCK_THRESHOLD {
        0.0
    } else {
        (PHASE_LOCK_THRESHOLD - coherence) * FRAC_PI_4
    }
}

/// Clamp to [0, 1], mapping NaN to 0.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
