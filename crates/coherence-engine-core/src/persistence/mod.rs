//! Durable history collaborator and the bounded writer feeding it.
//!
//! The storage engine itself is external; the engine only depends on the
//! [`HistoryStore`] contract. Writes are fire-and-forget from the scoring
//! path: [`PersistenceWriter`] owns a detached worker fed by a bounded queue
//! so a stalled store cannot grow memory without limit.

mod memory;
mod writer;

pub use memory::InMemoryHistoryStore;
pub use writer::{PersistenceStats, PersistenceWriter};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoherenceResult;
use crate::types::HarmonicSample;

/// A persisted sample and the coherence computed for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoherenceRecord {
    pub record_id: Uuid,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub sample: HarmonicSample,
    pub coherence_index: f64,
    pub recorded_at: DateTime<Utc>,
}

impl CoherenceRecord {
    pub fn new(
        user_id: impl Into<String>,
        session_id: Option<String>,
        sample: HarmonicSample,
        coherence_index: f64,
    ) -> Self {
        Self {
            record_id: Uuid::new_v4(),
            user_id: user_id.into(),
            session_id,
            sample,
            coherence_index,
            recorded_at: Utc::now(),
        }
    }
}

/// History store contract.
///
/// # Example
///
/// ```rust,ignore
/// let store = InMemoryHistoryStore::new();
/// store.append(record).await?;
/// let recent = store.query("u1", 100).await?;
/// ```
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Persist one record.
    async fn append(&self, record: CoherenceRecord) -> CoherenceResult<()>;

    /// Records for `user_id`, most recent first, at most `limit`.
    async fn query(&self, user_id: &str, limit: usize) -> CoherenceResult<Vec<CoherenceRecord>>;
}
