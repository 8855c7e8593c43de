//! Event bus: named publish/subscribe with synchronous fan-out.
//!
//! The engine receives its bus by injection; there is no process-wide
//! instance. [`InMemoryEventBus`] is the default transport and
//! [`NoopEventBus`] discards everything.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::{BridgeEvent, EventKind};

/// Callback invoked for each delivered event.
pub type EventHandler = Arc<dyn Fn(&BridgeEvent) + Send + Sync>;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    pub kind: EventKind,
    pub id: u64,
}

/// Publish/subscribe transport.
///
/// Delivery is synchronous: `publish` returns after every handler registered
/// for the event's kind at publish time has run.
pub trait EventBus: Send + Sync {
    fn publish(&self, event: &BridgeEvent);

    fn subscribe(&self, kind: EventKind, handler: EventHandler) -> Subscription;

    /// Returns `true` when the subscription existed and was removed.
    fn unsubscribe(&self, subscription: &Subscription) -> bool;
}

/// In-process event bus.
///
/// Handlers are snapshotted before dispatch, so a handler may publish or
/// (un)subscribe without deadlocking.
#[derive(Default)]
pub struct InMemoryEventBus {
    handlers: RwLock<HashMap<EventKind, Vec<(u64, EventHandler)>>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for InMemoryEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryEventBus")
            .field("kinds", &self.handlers.read().len())
            .finish()
    }
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handlers registered for `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.handlers.read().get(&kind).map_or(0, Vec::len)
    }
}

impl EventBus for InMemoryEventBus {
    fn publish(&self, event: &BridgeEvent) {
        let kind = event.kind();
        let handlers: Vec<EventHandler> = {
            let guard = self.handlers.read();
            match guard.get(&kind) {
                Some(bucket) => bucket.iter().map(|(_, h)| Arc::clone(h)).collect(),
                None => return,
            }
        };

        tracing::trace!(kind = %kind, handlers = handlers.len(), "Dispatching event");
        for handler in handlers {
            handler(event);
        }
    }

    fn subscribe(&self, kind: EventKind, handler: EventHandler) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let mut guard = self.handlers.write();
        let bucket = guard.entry(kind).or_default();
        bucket.push((id, handler));
        tracing::debug!(kind = %kind, total = bucket.len(), "Registered event handler");
        Subscription { kind, id }
    }

    fn unsubscribe(&self, subscription: &Subscription) -> bool {
        let mut guard = self.handlers.write();
        let Some(bucket) = guard.get_mut(&subscription.kind) else {
            return false;
        };
        let before = bucket.len();
        bucket.retain(|(id, _)| *id != subscription.id);
        let removed = bucket.len() != before;
        if bucket.is_empty() {
            guard.remove(&subscription.kind);
        }
        removed
    }
}

/// Bus that delivers nothing.
#[derive(Debug, Default)]
pub struct NoopEventBus {
    next_id: AtomicU64,
}

impl NoopEventBus {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventBus for NoopEventBus {
    fn publish(&self, _event: &BridgeEvent) {}

    fn subscribe(&self, kind: EventKind, _handler: EventHandler) -> Subscription {
        Subscription {
            kind,
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
        }
    }

    fn unsubscribe(&self, _subscription: &Subscription) -> bool {
        false
    }
}
