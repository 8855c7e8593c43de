//! Coherence engine for streams of harmonic analysis samples.
//!
//! Ingests harmonic samples tagged by user and session, derives a bounded,
//! smoothed coherence score in `[0, 1]`, and publishes throttled feedback
//! (gain, phase correction, recommendation) over an injected event bus.
//!
//! # Modules
//!
//! - [`history`]: per-user sliding windows of recent samples
//! - [`scoring`]: four-factor weighted score with exponential smoothing
//! - [`collective`]: group score across concurrently tracked users
//! - [`feedback`]: coherence to gain/phase/recommendation policy
//! - [`engine`]: orchestrator, session lifecycle and feedback throttle
//! - [`bus`]: publish/subscribe contract and in-memory transport
//! - [`persistence`]: history store contract and bounded writer
//! - [`clock`]: wall and replay clocks
//! - [`config`], [`error`], [`constants`]
//!
//! # Example
//!
//! ```
//! use coherence_engine_core::{FeedbackGenerator, RecommendationTier};
//!
//! let feedback = FeedbackGenerator::new().generate(0.9);
//! assert_eq!(feedback.phase_shift, 0.0);
//! assert_eq!(RecommendationTier::from_coherence(0.9), RecommendationTier::Excellent);
//! ```

pub mod bus;
pub mod clock;
pub mod collective;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod history;
pub mod persistence;
pub mod scoring;
pub mod types;

pub use config::{Config, EngineConfig, LoggingConfig, PersistenceConfig};
pub use error::{CoherenceError, CoherenceResult};

pub use bus::{EventBus, EventHandler, InMemoryEventBus, NoopEventBus, Subscription};
pub use clock::{Clock, ReplayClock, SystemClock};
pub use engine::{CoherenceEngine, EngineStatus, IngestOutcome};
pub use persistence::{
    CoherenceRecord, HistoryStore, InMemoryHistoryStore, PersistenceStats, PersistenceWriter,
};

pub use collective::{aggregate, CollectiveState};
pub use feedback::{CoherenceFeedback, FeedbackGenerator, RecommendationTier};
pub use history::{RollingWindow, SlidingHistoryStore, UserHistory};
pub use scoring::{CoherenceBreakdown, CoherenceScorer};

pub use types::{
    BridgeEvent, BridgeReadyEvent, CoherenceRequestEvent, CoherenceResponseEvent, EventKind,
    HarmonicDataEvent, HarmonicMode, HarmonicSample, HistoricalSummary, SessionEndEvent,
    SessionStartEvent, UserStateEvent, Waveform,
};
