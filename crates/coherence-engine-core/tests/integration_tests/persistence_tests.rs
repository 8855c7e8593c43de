//! Persistence through the bounded writer.

use std::sync::Arc;

use coherence_engine_core::{
    BridgeEvent, CoherenceEngine, Config, HarmonicDataEvent, InMemoryEventBus, ReplayClock,
    SessionStartEvent,
};

use super::helpers::{golden_sample, FailingStore, Harness};

#[tokio::test]
async fn test_emitted_feedback_is_persisted() {
    println!("=== FSV: persisted records follow emissions ===");
    let h = Harness::new();
    h.publish(BridgeEvent::SessionStart(SessionStartEvent {
        session_id: "s1".into(),
        user_id: Some("u1".into()),
    }));

    let mut scores = Vec::new();
    for i in 0..7u64 {
        let ts = i * 1_500;
        h.clock.advance_to(ts);
        let outcome = h
            .engine
            .ingest(&HarmonicDataEvent::new("u1", golden_sample(ts)))
            .unwrap();
        if outcome.published.is_some() {
            scores.push((ts, outcome.breakdown.score()));
        }
    }

    h.engine.shutdown().await;

    let stats = h.engine.status().persistence;
    println!("AFTER: emitted={} stats={:?}", scores.len(), stats);
    // 0, 3000, 6000, 9000
    assert_eq!(scores.len(), 4);
    assert_eq!(stats.written, 4);
    assert_eq!(stats.failed, 0);
    assert_eq!(h.store.len("u1"), 4);

    let records = h.engine.load_history("u1").await;
    assert_eq!(records.len(), 4);
    let (last_ts, last_score) = scores[scores.len() - 1];
    assert_eq!(records[0].sample.timestamp, last_ts as f64);
    assert_eq!(records[0].coherence_index, last_score);
    assert!(records
        .iter()
        .all(|r| r.session_id.as_deref() == Some("s1")));
    println!("[VERIFIED] most recent record first, session id attached");
}

#[tokio::test]
async fn test_event_session_id_takes_precedence() {
    let h = Harness::new();
    h.publish(BridgeEvent::SessionStart(SessionStartEvent {
        session_id: "current".into(),
        user_id: None,
    }));
    h.engine
        .ingest(&HarmonicDataEvent::new("u1", golden_sample(0)).with_session("explicit"))
        .unwrap();
    h.engine.shutdown().await;

    let records = h.engine.load_history("u1").await;
    assert_eq!(records[0].session_id.as_deref(), Some("explicit"));
}

#[tokio::test]
async fn test_store_failure_does_not_block_emission() {
    println!("=== FSV: failing store ===");
    let bus = Arc::new(InMemoryEventBus::new());
    let clock = Arc::new(ReplayClock::new(0));
    let engine =
        CoherenceEngine::with_clock(Config::default(), bus, Arc::new(FailingStore), clock.clone())
            .unwrap();

    let first = engine
        .ingest(&HarmonicDataEvent::new("u1", golden_sample(0)))
        .unwrap();
    clock.advance_to(3_000);
    let second = engine
        .ingest(&HarmonicDataEvent::new("u1", golden_sample(3_000)))
        .unwrap();
    assert!(first.published.is_some());
    assert!(second.published.is_some());

    engine.shutdown().await;
    let stats = engine.status().persistence;
    println!("AFTER: {:?}", stats);
    assert_eq!(stats.failed, 2);
    assert_eq!(stats.written, 0);

    assert!(engine.load_history("u1").await.is_empty());
    println!("[VERIFIED] failures counted, query resolves empty");
}

#[tokio::test]
async fn test_query_limit_caps_history() {
    let mut config = Config::default();
    config.persistence.query_limit = 2;
    config.engine.feedback_interval_ms = 1;
    let h = Harness::with_config(config);

    for ts in 0..5u64 {
        h.clock.advance_to(ts);
        h.engine
            .ingest(&HarmonicDataEvent::new("u1", golden_sample(ts)))
            .unwrap();
    }
    h.engine.shutdown().await;

    assert_eq!(h.store.len("u1"), 5);
    let records = h.engine.load_history("u1").await;
    let timestamps: Vec<f64> = records.iter().map(|r| r.sample.timestamp).collect();
    assert_eq!(timestamps, vec![4.0, 3.0]);
}

#[tokio::test]
async fn test_ingest_after_shutdown_still_scores() {
    let h = Harness::new();
    h.engine.shutdown().await;
    assert!(!h.engine.is_listening());

    let outcome = h
        .engine
        .ingest(&HarmonicDataEvent::new("u1", golden_sample(0)))
        .unwrap();
    assert!(outcome.published.is_some());
    assert_eq!(h.store.len("u1"), 0);
}
