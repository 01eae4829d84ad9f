//! Backend failures are logged and leave engine state untouched.

mod common;

use clearpath_core::{
    backend::{ContactForm, HttpBackend, CONTACT_ERROR_MESSAGE},
    simulator::Phase,
};
use common::{engine_with, FailingBackend, Failure, FlakyBackend, RecordingBackend};

fn form() -> ContactForm {
    ContactForm {
        name:         "Asha".into(),
        email:        "asha@example.org".into(),
        organization: "City EMS".into(),
        interest:     "pilot".into(),
        message:      "Interested in a pilot.".into(),
    }
}

#[test]
fn operations_reach_the_backend() {
    let backend = RecordingBackend::default();
    let mut engine = engine_with(backend.clone());

    engine.trigger().unwrap();
    engine.advance(1_000).unwrap();
    let id = engine.alerts().alerts()[0].id;
    engine.acknowledge_alert(id).unwrap();
    let message = engine.submit_contact(&form());
    engine.reset().unwrap();

    assert_eq!(message, "Thanks, Asha!");
    assert_eq!(
        backend.calls(),
        vec![
            "trigger".to_string(),
            format!("acknowledge {id}"),
            "contact asha@example.org".to_string(),
            "reset".to_string(),
        ]
    );
}

#[test]
fn failed_trigger_changes_nothing() {
    for failure in [Failure::Transport, Failure::ErrorStatus] {
        let mut engine = engine_with(FailingBackend(failure));
        let logged = engine.event_log().len();

        let events = engine.trigger().unwrap();
        assert!(events.is_empty());
        assert!(!engine.simulation().active);
        assert_eq!(engine.simulation().phase, Phase::Standby);
        assert_eq!(engine.pending_sequence_steps(), 0);
        assert_eq!(engine.event_log().len(), logged);

        engine.advance(10_000).unwrap();
        assert_eq!(engine.simulation().progress, 0);
        assert!(engine.alerts().alerts().is_empty());
    }
}

#[test]
fn failed_reset_keeps_the_mission_running() {
    let mut engine = engine_with(FlakyBackend);
    engine.trigger().unwrap();
    engine.advance(4_000).unwrap();
    let before = engine.simulation().clone();

    assert!(engine.reset().unwrap().is_empty());
    assert_eq!(engine.simulation(), &before);
    assert_eq!(engine.alerts().alerts().len(), 2);
    assert!(engine.pending_sequence_steps() > 0);
}

#[test]
fn failed_acknowledge_leaves_alert_pending() {
    let mut engine = engine_with(FlakyBackend);
    engine.trigger().unwrap();
    engine.advance(1_000).unwrap();
    let id = engine.alerts().alerts()[0].id;

    assert!(engine.acknowledge_alert(id).unwrap().is_empty());
    assert!(engine.alerts().alerts()[0].is_pending());
}

#[test]
fn failed_contact_shows_the_fixed_error() {
    let mut engine = engine_with(FailingBackend(Failure::Transport));
    assert_eq!(engine.submit_contact(&form()), CONTACT_ERROR_MESSAGE);

    let mut engine = engine_with(FlakyBackend);
    assert_eq!(engine.submit_contact(&form()), CONTACT_ERROR_MESSAGE);
}

#[test]
fn unreachable_http_backend_is_a_logged_failure() {
    let backend = HttpBackend::new("http://127.0.0.1:9/api").unwrap();
    let mut engine = engine_with(backend);

    assert!(engine.trigger().unwrap().is_empty());
    assert!(!engine.simulation().active);
    assert_eq!(engine.submit_contact(&form()), CONTACT_ERROR_MESSAGE);
}
