//! Per-user sliding history.
//!
//! Each tracked user owns four parallel bounded sequences (frequency,
//! coherence, timestamp, harmonic alignment). When a sequence exceeds the
//! window the oldest entry is evicted.

mod store;
mod window;

pub use store::{SlidingHistoryStore, UserHistory};
pub use window::{mean, population_std_dev, population_variance, RollingWindow};
