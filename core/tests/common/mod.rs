//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use clearpath_core::{
    backend::{ApiResponse, Backend, ContactForm},
    config::DemoConfig,
    engine::DemoEngine,
    error::{SimError, SimResult},
    types::EntityId,
};
use std::sync::{Arc, Mutex};

pub const SEED: u64 = 0xC1EA_2BA7_0000_0001;

pub fn started_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 14, 9, 30, 0).unwrap()
}

/// Route `log` output through the test harness. `RUST_LOG=debug` to see it.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn offline_engine(seed: u64) -> DemoEngine {
    init_logging();
    DemoEngine::offline(format!("test-{seed}"), seed, started_at())
}

pub fn engine_with(backend: impl Backend + 'static) -> DemoEngine {
    init_logging();
    DemoEngine::new(
        format!("test-{SEED}"),
        SEED,
        started_at(),
        DemoConfig::default(),
        Box::new(backend),
    )
}

/// Succeeds on every call and records which endpoint was hit.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingBackend {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Backend for RecordingBackend {
    fn name(&self) -> &'static str { "recording" }

    fn trigger_emergency(&mut self) -> SimResult<ApiResponse> {
        self.record("trigger".into());
        Ok(ApiResponse::success("Emergency mode activated"))
    }

    fn reset_emergency(&mut self) -> SimResult<ApiResponse> {
        self.record("reset".into());
        Ok(ApiResponse::success("Emergency mode reset"))
    }

    fn acknowledge_alert(&mut self, alert_id: EntityId) -> SimResult<ApiResponse> {
        self.record(format!("acknowledge {alert_id}"));
        Ok(ApiResponse::success("Alert acknowledged successfully"))
    }

    fn submit_contact(&mut self, form: &ContactForm) -> SimResult<ApiResponse> {
        self.record(format!("contact {}", form.email));
        Ok(ApiResponse::success(format!("Thanks, {}!", form.name)))
    }
}

/// How a failing backend fails.
#[derive(Clone, Copy)]
pub enum Failure {
    /// Transport-level: the request never produced a response.
    Transport,
    /// The backend answered with `status: "error"`.
    ErrorStatus,
}

pub struct FailingBackend(pub Failure);

impl FailingBackend {
    fn fail(&self, endpoint: &str) -> SimResult<ApiResponse> {
        match self.0 {
            Failure::Transport => Err(SimError::BackendRejected {
                endpoint: endpoint.into(),
                message:  "503 Service Unavailable".into(),
            }),
            Failure::ErrorStatus => Ok(ApiResponse::error("Emergency already active")),
        }
    }
}

impl Backend for FailingBackend {
    fn name(&self) -> &'static str { "failing" }

    fn trigger_emergency(&mut self) -> SimResult<ApiResponse> {
        self.fail("/emergency/trigger")
    }

    fn reset_emergency(&mut self) -> SimResult<ApiResponse> {
        self.fail("/emergency/reset")
    }

    fn acknowledge_alert(&mut self, alert_id: EntityId) -> SimResult<ApiResponse> {
        self.fail(&format!("/alerts/{alert_id}/acknowledge"))
    }

    fn submit_contact(&mut self, _form: &ContactForm) -> SimResult<ApiResponse> {
        self.fail("/contact")
    }
}

/// Succeeds on trigger, fails everything else. Lets a test start a
/// mission and then watch later calls fail.
pub struct FlakyBackend;

impl Backend for FlakyBackend {
    fn name(&self) -> &'static str { "flaky" }

    fn trigger_emergency(&mut self) -> SimResult<ApiResponse> {
        Ok(ApiResponse::success("Emergency mode activated"))
    }

    fn reset_emergency(&mut self) -> SimResult<ApiResponse> {
        Ok(ApiResponse::error("backend unavailable"))
    }

    fn acknowledge_alert(&mut self, _alert_id: EntityId) -> SimResult<ApiResponse> {
        Ok(ApiResponse::error("backend unavailable"))
    }

    fn submit_contact(&mut self, _form: &ContactForm) -> SimResult<ApiResponse> {
        Ok(ApiResponse::error("backend unavailable"))
    }
}
