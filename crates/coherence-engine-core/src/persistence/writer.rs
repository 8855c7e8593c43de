//! Bounded, detached persistence writer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use super::{CoherenceRecord, HistoryStore};
use crate::error::{CoherenceError, CoherenceResult};

/// Snapshot of writer counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceStats {
    /// Records accepted into the queue
    pub enqueued: u64,
    /// Records the store accepted
    pub written: u64,
    /// Records the store rejected
    pub failed: u64,
    /// Records dropped because the queue was full
    pub dropped: u64,
}

#[derive(Debug, Default)]
struct Counters {
    enqueued: AtomicU64,
    written: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> PersistenceStats {
        PersistenceStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            written: self.written.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Detached worker draining a bounded queue into a [`HistoryStore`].
///
/// `enqueue` never waits. There is no per-write cancellation or timeout;
/// [`PersistenceWriter::close`] stops intake and waits for queued writes.
pub struct PersistenceWriter {
    sender: Mutex<Option<mpsc::Sender<CoherenceRecord>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    counters: Arc<Counters>,
    capacity: usize,
}

impl std::fmt::Debug for PersistenceWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceWriter")
            .field("capacity", &self.capacity)
            .field("stats", &self.counters.snapshot())
            .finish()
    }
}

impl PersistenceWriter {
    /// Start the worker on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// `RuntimeUnavailable` when called outside a runtime.
    pub fn spawn(store: Arc<dyn HistoryStore>, capacity: usize) -> CoherenceResult<Self> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| CoherenceError::RuntimeUnavailable(e.to_string()))?;

        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        let counters = Arc::new(Counters::default());

        let worker_counters = Arc::clone(&counters);
        let worker = runtime.spawn(async move {
            worker_loop(store, receiver, worker_counters).await;
        });

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
            counters,
            capacity,
        })
    }

    /// Queue a record without waiting.
    ///
    /// # Errors
    ///
    /// - `PersistenceQueueFull` when the queue is at capacity (record dropped)
    /// - `PersistenceClosed` after [`close`](Self::close)
    pub fn enqueue(&self, record: CoherenceRecord) -> CoherenceResult<()> {
        let guard = self.sender.lock();
        let Some(sender) = guard.as_ref() else {
            return Err(CoherenceError::PersistenceClosed);
        };

        match sender.try_send(record) {
            Ok(()) => {
                self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                Err(CoherenceError::PersistenceQueueFull {
                    capacity: self.capacity,
                })
            }
            Err(TrySendError::Closed(_)) => Err(CoherenceError::PersistenceClosed),
        }
    }

    /// Stop accepting records and wait for queued writes to finish.
    ///
    /// Idempotent.
    pub async fn close(&self) {
        drop(self.sender.lock().take());

        let worker = self.worker.lock().take();
        if let Some(handle) = worker {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Persistence worker terminated abnormally");
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.lock().is_none()
    }

    pub fn stats(&self) -> PersistenceStats {
        self.counters.snapshot()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

async fn worker_loop(
    store: Arc<dyn HistoryStore>,
    mut receiver: mpsc::Receiver<CoherenceRecord>,
    counters: Arc<Counters>,
) {
    while let Some(record) = receiver.recv().await {
        let user_id = record.user_id.clone();
        match store.append(record).await {
            Ok(()) => {
                counters.written.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "Failed to persist coherence sample (non-fatal)"
                );
            }
        }
    }
    tracing::debug!("Persistence worker drained");
}
