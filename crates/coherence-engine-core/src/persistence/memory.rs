//! In-memory history store.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{CoherenceRecord, HistoryStore};
use crate::error::CoherenceResult;

/// History store backed by a map of per-user vectors. Unbounded.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    records: RwLock<HashMap<String, Vec<CoherenceRecord>>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records stored for `user_id`.
    pub fn len(&self, user_id: &str) -> usize {
        self.records.read().get(user_id).map_or(0, Vec::len)
    }

    /// Number of records across all users.
    pub fn total(&self) -> usize {
        self.records.read().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, record: CoherenceRecord) -> CoherenceResult<()> {
        self.records
            .write()
            .entry(record.user_id.clone())
            .or_default()
            .push(record);
        Ok(())
    }

    async fn query(&self, user_id: &str, limit: usize) -> CoherenceResult<Vec<CoherenceRecord>> {
        let guard = self.records.read();
        Ok(guard
            .get(user_id)
            .map(|records| records.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}
