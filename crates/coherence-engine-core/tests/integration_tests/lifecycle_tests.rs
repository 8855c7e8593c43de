//! Listening state, sessions and bridge events.

use coherence_engine_core::{
    BridgeEvent, CoherenceRequestEvent, EventKind, HarmonicDataEvent, SessionEndEvent,
    SessionStartEvent, UserStateEvent,
};

use super::helpers::{approx_eq, golden_sample, Harness};

fn request(user: &str) -> BridgeEvent {
    BridgeEvent::CoherenceRequest(CoherenceRequestEvent {
        user_id: user.into(),
    })
}

fn feed(h: &Harness, user: &str, count: u64) {
    for ts in 0..count {
        h.publish(BridgeEvent::HarmonicData(HarmonicDataEvent::new(
            user,
            golden_sample(ts),
        )));
    }
}

#[tokio::test]
async fn test_start_and_stop_idempotent() {
    let h = Harness::new();
    assert!(h.engine.is_listening());

    h.engine.start();
    for kind in EventKind::INBOUND {
        assert_eq!(h.bus.listener_count(kind), 1, "{} subscribed once", kind);
    }

    h.engine.stop();
    h.engine.stop();
    assert!(!h.engine.is_listening());
    for kind in EventKind::INBOUND {
        assert_eq!(h.bus.listener_count(kind), 0);
    }

    // idle engine ignores the bus
    feed(&h, "u1", 3);
    assert_eq!(h.engine.status().tracked_users, 0);

    h.engine.start();
    feed(&h, "u1", 1);
    assert_eq!(h.engine.status().tracked_users, 1);
}

#[tokio::test]
async fn test_coherence_request_summarises_history() {
    println!("=== FSV: coherence-request after four samples ===");
    let h = Harness::new();
    feed(&h, "u1", 4);
    h.clear_outbound();

    h.publish(request("u1"));

    let events = h.outbound.lock().clone();
    assert_eq!(events.len(), 1);
    match &events[0] {
        BridgeEvent::CoherenceResponse(response) => {
            println!("AFTER: {:?}", response);
            assert_eq!(response.user_id, "u1");
            // each sample is recorded twice
            assert_eq!(response.historical_data.count, 8);
            assert!(approx_eq(response.historical_data.avg, 0.7));
            assert!(approx_eq(response.historical_data.min, 0.7));
            assert!(approx_eq(response.historical_data.max, 0.7));
            assert_eq!(response.coherence_index, response.historical_data.avg);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_coherence_request_unknown_user_is_silent() {
    let h = Harness::new();
    h.publish(request("ghost"));
    assert_eq!(h.count(EventKind::CoherenceResponse), 0);
}

#[tokio::test]
async fn test_bridge_disconnect_resets_all_history() {
    println!("=== FSV: bridge-disconnected clears every user ===");
    let h = Harness::new();
    feed(&h, "u1", 3);
    h.engine
        .ingest(&HarmonicDataEvent::new("u2", golden_sample(10)).collective())
        .unwrap();
    let before = h.engine.status();
    println!("BEFORE: {:?}", before);
    assert_eq!(before.tracked_users, 2);
    assert_eq!(before.collective_users, 1);

    h.publish(BridgeEvent::BridgeDisconnected(serde_json::json!({"reason": "closed"})));

    let after = h.engine.status();
    println!("AFTER: {:?}", after);
    assert_eq!(after.tracked_users, 0);
    assert_eq!(after.collective_users, 0);

    h.clear_outbound();
    h.publish(request("u1"));
    h.publish(request("u2"));
    assert_eq!(h.count(EventKind::CoherenceResponse), 0);
    println!("[VERIFIED] no response for previously tracked users");
}

#[tokio::test]
async fn test_bridge_connected_announces_capabilities() {
    let h = Harness::new();
    h.publish(BridgeEvent::BridgeConnected(serde_json::json!({})));

    let events = h.outbound.lock().clone();
    assert_eq!(events.len(), 1);
    match &events[0] {
        BridgeEvent::BridgeReady(ready) => {
            assert_eq!(ready.status, "ready");
            assert_eq!(ready.capabilities, h.engine.config().engine.capabilities);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_session_start_resets_user_history() {
    let h = Harness::new();
    feed(&h, "u1", 3);

    h.publish(BridgeEvent::SessionStart(SessionStartEvent {
        session_id: "s1".into(),
        user_id: Some("u1".into()),
    }));

    let status = h.engine.status();
    assert_eq!(status.session_id.as_deref(), Some("s1"));
    assert_eq!(status.tracked_users, 1);

    h.clear_outbound();
    h.publish(request("u1"));
    assert_eq!(h.count(EventKind::CoherenceResponse), 0);
}

#[tokio::test]
async fn test_session_start_without_user_keeps_history() {
    let h = Harness::new();
    feed(&h, "u1", 2);
    h.publish(BridgeEvent::SessionStart(SessionStartEvent {
        session_id: "s2".into(),
        user_id: None,
    }));

    h.clear_outbound();
    h.publish(request("u1"));
    assert_eq!(h.count(EventKind::CoherenceResponse), 1);
}

#[tokio::test]
async fn test_session_end_keeps_history() {
    println!("=== FSV: session-end clears the session id only ===");
    let h = Harness::new();
    h.publish(BridgeEvent::SessionStart(SessionStartEvent {
        session_id: "s1".into(),
        user_id: Some("u1".into()),
    }));
    feed(&h, "u1", 2);

    h.publish(BridgeEvent::SessionEnd(SessionEndEvent {
        session_id: "s1".into(),
    }));

    let status = h.engine.status();
    assert!(status.session_id.is_none());
    assert_eq!(status.tracked_users, 1);

    h.clear_outbound();
    h.publish(request("u1"));
    assert_eq!(h.count(EventKind::CoherenceResponse), 1);
    println!("[VERIFIED] per-user history survives session end");
}

#[tokio::test]
async fn test_user_state_has_no_scoring_effect() {
    let h = Harness::new();
    let before = h.engine.status();
    h.publish(BridgeEvent::UserState(UserStateEvent {
        user_id: "u1".into(),
        intention: Some("focus".into()),
        emotional_state: Some("calm".into()),
    }));
    assert_eq!(h.engine.status(), before);
    assert!(h.outbound.lock().is_empty());
}
