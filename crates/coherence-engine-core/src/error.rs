//! Coherence engine error types.
//!
//! Three classes of failure exist in the engine:
//!
//! - malformed input (missing identifiers, non-finite sample fields), which is
//!   dropped with a warning and never mutates state
//! - persistence failures, which are logged at the call site and never reach
//!   the scoring path
//! - configuration and runtime errors, raised at construction time
//!
//! Empty or insufficient history is not an error: sub-scores fall back to
//! their neutral defaults instead.

use thiserror::Error;

/// Errors that can occur in the coherence engine.
#[derive(Debug, Error)]
pub enum CoherenceError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A required identifier was absent from an inbound event
    #[error("Missing identifier '{field}' on {event} event")]
    MissingIdentifier {
        /// Wire name of the event
        event: String,
        /// Name of the absent field
        field: String,
    },

    /// A harmonic sample carried an unusable value
    #[error("Invalid harmonic sample field '{field}': {reason}")]
    InvalidSample {
        /// Offending field
        field: String,
        /// Reason for invalidity
        reason: String,
    },

    /// History store failure
    #[error("History store error: {0}")]
    StorageError(String),

    /// Persistence queue at capacity, record dropped
    #[error("Persistence queue full (capacity {capacity})")]
    PersistenceQueueFull {
        /// Configured queue bound
        capacity: usize,
    },

    /// Persistence writer already closed
    #[error("Persistence writer is closed")]
    PersistenceClosed,

    /// No Tokio runtime available to host background work
    #[error("Tokio runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type for coherence engine operations.
pub type CoherenceResult<T> = Result<T, CoherenceError>;

impl From<serde_json::Error> for CoherenceError {
    fn from(err: serde_json::Error) -> Self {
        CoherenceError::SerializationError(err.to_string())
    }
}

impl From<::config::ConfigError> for CoherenceError {
    fn from(err: ::config::ConfigError) -> Self {
        CoherenceError::ConfigError(err.to_string())
    }
}

impl CoherenceError {
    /// Create a missing identifier error.
    pub fn missing_identifier(event: impl Into<String>, field: impl Into<String>) -> Self {
        CoherenceError::MissingIdentifier {
            event: event.into(),
            field: field.into(),
        }
    }

    /// Create an invalid sample error.
    pub fn invalid_sample(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CoherenceError::InvalidSample {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error came from malformed inbound data.
    ///
    /// Such input is dropped with a warning and leaves engine state untouched.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CoherenceError::MissingIdentifier { .. }
                | CoherenceError::InvalidSample { .. }
                | CoherenceError::SerializationError(_)
        )
    }

    /// Check if this error came from the persistence path.
    pub fn is_persistence_error(&self) -> bool {
        matches!(
            self,
            CoherenceError::StorageError(_)
                | CoherenceError::PersistenceQueueFull { .. }
                | CoherenceError::PersistenceClosed
        )
    }
}
