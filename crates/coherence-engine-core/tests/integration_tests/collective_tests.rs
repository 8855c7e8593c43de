//! Collective mode through the engine.

use coherence_engine_core::{aggregate, HarmonicDataEvent, HarmonicMode};

use super::helpers::{approx_eq, golden_sample, Harness};

#[tokio::test]
async fn test_single_user_collective_score() {
    println!("=== FSV: collective mode with one user ===");
    let h = Harness::new();

    let outcome = h
        .engine
        .ingest(&HarmonicDataEvent::new("u1", golden_sample(0)).collective())
        .unwrap();

    let score = outcome.breakdown.score();
    let group = outcome.collective_score.expect("collective mode");
    println!("AFTER: user={} group={}", score, group);

    // one user: zero variance, sync = 1
    assert!(approx_eq(group, 0.7 * score + 0.3));
    let published = outcome.published.unwrap();
    assert!(approx_eq(published.coherence_index, group));
    assert_eq!(h.engine.status().collective_users, 1);
}

#[tokio::test]
async fn test_group_score_published_across_users() {
    let h = Harness::new();

    let first = h
        .engine
        .ingest(&HarmonicDataEvent::new("u1", golden_sample(0)).collective())
        .unwrap();

    h.clock.advance_to(3_000);
    let second = h
        .engine
        .ingest(
            &HarmonicDataEvent::new("u2", golden_sample(3_000).with_harmonics(vec![100.0, 137.0]))
                .collective(),
        )
        .unwrap();

    let expected = aggregate(&[first.breakdown.score(), second.breakdown.score()]);
    assert!(approx_eq(second.collective_score.unwrap(), expected));
    assert!(approx_eq(second.published.unwrap().coherence_index, expected));
    assert_eq!(h.engine.status().collective_users, 2);
}

#[tokio::test]
async fn test_individual_mode_leaves_collective_state_alone() {
    let h = Harness::new();
    let event = HarmonicDataEvent::new("u1", golden_sample(0));
    assert_eq!(event.mode, HarmonicMode::Individual);

    let outcome = h.engine.ingest(&event).unwrap();
    assert!(outcome.collective_score.is_none());
    assert!(approx_eq(
        outcome.published.unwrap().coherence_index,
        outcome.breakdown.score()
    ));
    assert_eq!(h.engine.status().collective_users, 0);
}

#[tokio::test]
async fn test_collective_updates_overwrite_per_user() {
    let h = Harness::new();
    for ts in 0..5 {
        h.engine
            .ingest(&HarmonicDataEvent::new("u1", golden_sample(ts)).collective())
            .unwrap();
    }
    assert_eq!(h.engine.status().collective_users, 1);
}
