//! Harmonic samples produced by the upstream analyser.

use serde::{Deserialize, Serialize};

use crate::error::{CoherenceError, CoherenceResult};

/// Oscillator waveform the sample was analysed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One harmonic measurement.
///
/// Created by the external producer and consumed once by the engine. The
/// harmonic stack is ordered fundamental first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarmonicSample {
    /// Frequency in Hz
    pub frequency: f64,
    /// Amplitude (>= 0)
    pub amplitude: f64,
    /// Harmonic stack frequencies, fundamental first
    #[serde(default)]
    pub harmonics: Vec<f64>,
    /// Phase in radians
    #[serde(default)]
    pub phase: f64,
    /// Coherence index as reported by the producer
    #[serde(default)]
    pub coherence: f64,
    /// Timestamp in milliseconds, possibly fractional
    pub timestamp: f64,
    #[serde(default)]
    pub waveform: Waveform,
}

impl HarmonicSample {
    /// Create a sample with a single-entry harmonic stack at `frequency`.
    pub fn new(frequency: f64, amplitude: f64, timestamp: f64) -> Self {
        Self {
            frequency,
            amplitude,
            harmonics: vec![frequency],
            phase: 0.0,
            coherence: 0.0,
            timestamp,
            waveform: Waveform::Sine,
        }
    }

    pub fn with_harmonics(mut self, harmonics: Vec<f64>) -> Self {
        self.harmonics = harmonics;
        self
    }

    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_coherence(mut self, coherence: f64) -> Self {
        self.coherence = coherence;
        self
    }

    pub fn with_waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    /// Reject samples carrying NaN or infinite values.
    ///
    /// Every scoring formula assumes finite input; a non-finite field would
    /// poison the engine-wide smoothed state.
    pub fn validate(&self) -> CoherenceResult<()> {
        let scalars = [
            ("frequency", self.frequency),
            ("amplitude", self.amplitude),
            ("phase", self.phase),
            ("coherence", self.coherence),
            ("timestamp", self.timestamp),
        ];
        for (field, value) in scalars {
            if !value.is_finite() {
                return Err(CoherenceError::invalid_sample(
                    field,
                    format!("must be finite, got {}", value),
                ));
            }
        }
        if let Some(i) = self.harmonics.iter().position(|h| !h.is_finite()) {
            return Err(CoherenceError::invalid_sample(
                "harmonics",
                format!("entry {} must be finite", i),
            ));
        }
        Ok(())
    }
}
