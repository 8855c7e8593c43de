//! Shared fixtures for the integration tests.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use coherence_engine_core::{
    BridgeEvent, CoherenceEngine, CoherenceError, CoherenceFeedback, CoherenceRecord,
    CoherenceResult, Config, EventBus, EventKind, HarmonicSample, HistoryStore,
    InMemoryEventBus, InMemoryHistoryStore, ReplayClock,
};

/// Engine wired to an in-memory bus, store and replay clock, with every
/// outbound event captured.
pub struct Harness {
    pub bus: Arc<InMemoryEventBus>,
    pub clock: Arc<ReplayClock>,
    pub store: Arc<InMemoryHistoryStore>,
    pub engine: CoherenceEngine,
    pub outbound: Arc<Mutex<Vec<BridgeEvent>>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let bus = Arc::new(InMemoryEventBus::new());
        let clock = Arc::new(ReplayClock::new(0));
        let store = Arc::new(InMemoryHistoryStore::new());
        let engine = CoherenceEngine::with_clock(config, bus.clone(), store.clone(), clock.clone())
            .expect("engine construction");

        let outbound = Arc::new(Mutex::new(Vec::new()));
        for kind in EventKind::OUTBOUND {
            let sink = Arc::clone(&outbound);
            bus.subscribe(
                kind,
                Arc::new(move |event: &BridgeEvent| sink.lock().push(event.clone())),
            );
        }

        engine.start();
        Self {
            bus,
            clock,
            store,
            engine,
            outbound,
        }
    }

    pub fn publish(&self, event: BridgeEvent) {
        self.bus.publish(&event);
    }

    pub fn updates(&self) -> Vec<CoherenceFeedback> {
        self.outbound
            .lock()
            .iter()
            .filter_map(|event| match event {
                BridgeEvent::CoherenceUpdate(feedback) => Some(feedback.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.outbound
            .lock()
            .iter()
            .filter(|event| event.kind() == kind)
            .count()
    }

    pub fn clear_outbound(&self) {
        self.outbound.lock().clear();
    }
}

/// Sample at 432 Hz with a golden-ratio second harmonic.
pub fn golden_sample(timestamp: u64) -> HarmonicSample {
    HarmonicSample::new(432.0, 0.5, timestamp as f64)
        .with_harmonics(vec![432.0, 699.1])
        .with_coherence(0.7)
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Store that rejects every call.
pub struct FailingStore;

#[async_trait]
impl HistoryStore for FailingStore {
    async fn append(&self, _record: CoherenceRecord) -> CoherenceResult<()> {
        Err(CoherenceError::StorageError("connection refused".into()))
    }

    async fn query(&self, _user_id: &str, _limit: usize) -> CoherenceResult<Vec<CoherenceRecord>> {
        Err(CoherenceError::StorageError("connection refused".into()))
    }
}
