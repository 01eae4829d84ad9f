//! Two engines, same seed, same operations.
//! They must produce byte-identical event logs.

mod common;

use clearpath_core::engine::DemoEngine;
use common::{offline_engine, SEED};

fn drive(engine: &mut DemoEngine) {
    engine.connect().expect("connect");
    engine.trigger().expect("trigger");
    engine.advance(7_000).expect("advance through sequence");
    let first = engine.alerts().alerts()[0].id;
    engine.acknowledge_alert(first).expect("acknowledge");
    engine.advance(120_000).expect("advance through mission");
    engine.toggle().expect("toggle resets");
    engine.advance(31_000).expect("advance idle");
}

fn payloads(engine: &DemoEngine) -> Vec<String> {
    engine.event_log().entries().iter().map(|e| e.payload.clone()).collect()
}

#[test]
fn same_seed_produces_identical_event_logs() {
    let mut engine_a = offline_engine(SEED);
    let mut engine_b = offline_engine(SEED);

    drive(&mut engine_a);
    drive(&mut engine_b);

    let log_a = payloads(&engine_a);
    let log_b = payloads(&engine_b);

    assert_eq!(
        log_a.len(), log_b.len(),
        "Event log lengths differ: {} vs {}",
        log_a.len(), log_b.len()
    );

    for (i, (a, b)) in log_a.iter().zip(log_b.iter()).enumerate() {
        assert_eq!(a, b, "Event log diverged at entry {i}:\n  A: {a}\n  B: {b}");
    }
}

#[test]
fn different_seeds_diverge() {
    let mut engine_a = offline_engine(SEED);
    let mut engine_b = offline_engine(SEED ^ 0xFFFF);

    drive(&mut engine_a);
    drive(&mut engine_b);

    assert_ne!(payloads(&engine_a), payloads(&engine_b));
}

#[test]
fn log_sequence_numbers_are_dense_and_time_ordered() {
    let mut engine = offline_engine(SEED);
    drive(&mut engine);

    let entries = engine.event_log().entries();
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.seq, i as u64);
    }
    for pair in entries.windows(2) {
        assert!(pair[0].at_ms <= pair[1].at_ms, "log went back in time at seq {}", pair[1].seq);
    }
}
