//! Backend client.
//!
//! The demo talks to four endpoints, all `POST`, all answering
//! `{status, message?, data?}`:
//!
//!   /emergency/trigger
//!   /emergency/reset
//!   /alerts/{id}/acknowledge
//!   /contact
//!
//! Calls are fire-and-forget: no retry, no cancellation. Callers go
//! through [`settle`], which logs any failure and hands back a response
//! only when the backend reported success.

use crate::{
    error::{SimError, SimResult},
    types::EntityId,
};
use reqwest::{blocking::Client, header::CONTENT_TYPE};
use serde::{Deserialize, Serialize};

/// Shown to the user when a contact submission fails for any reason.
pub const CONTACT_ERROR_MESSAGE: &str = "Error submitting form. Please try again.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name:         String,
    pub email:        String,
    pub organization: String,
    pub interest:     String,
    pub message:      String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status:  String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data:    Option<serde_json::Value>,
}

impl ApiResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self { status: "success".into(), message: Some(message.into()), data: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { status: "error".into(), message: Some(message.into()), data: None }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// The contract every backend must fulfill.
pub trait Backend: Send {
    /// Short stable name, used in log lines.
    fn name(&self) -> &'static str;

    fn trigger_emergency(&mut self) -> SimResult<ApiResponse>;

    fn reset_emergency(&mut self) -> SimResult<ApiResponse>;

    fn acknowledge_alert(&mut self, alert_id: EntityId) -> SimResult<ApiResponse>;

    fn submit_contact(&mut self, form: &ContactForm) -> SimResult<ApiResponse>;
}

/// Resolve a backend call: log failures, keep only successes.
pub fn settle(operation: &str, result: SimResult<ApiResponse>) -> Option<ApiResponse> {
    match result {
        Ok(response) if response.is_success() => Some(response),
        Ok(response) => {
            log::error!(
                "Failed to {operation}: {}",
                response.message.as_deref().unwrap_or("no message")
            );
            None
        }
        Err(e) => {
            log::error!("Error during {operation}: {e}");
            None
        }
    }
}

/// Runs the demo with no backend at all: every call succeeds locally.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineBackend;

impl Backend for OfflineBackend {
    fn name(&self) -> &'static str { "offline" }

    fn trigger_emergency(&mut self) -> SimResult<ApiResponse> {
        Ok(ApiResponse::success("Emergency mode activated"))
    }

    fn reset_emergency(&mut self) -> SimResult<ApiResponse> {
        Ok(ApiResponse::success("Emergency mode reset"))
    }

    fn acknowledge_alert(&mut self, _alert_id: EntityId) -> SimResult<ApiResponse> {
        Ok(ApiResponse::success("Alert acknowledged successfully"))
    }

    fn submit_contact(&mut self, _form: &ContactForm) -> SimResult<ApiResponse> {
        Ok(ApiResponse::success(
            "Thank you for your interest! We'll get back to you within 24 hours.",
        ))
    }
}

/// Blocking HTTP client against a running backend.
pub struct HttpBackend {
    base_url: String,
    client:   Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> SimResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder().build()?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post<B: Serialize>(&self, path: &str, body: Option<&B>) -> SimResult<ApiResponse> {
        let url = self.endpoint(path);
        log::debug!("backend: POST {url}");
        let request = self.client.post(&url).header(CONTENT_TYPE, "application/json");
        let request = match body {
            Some(body) => request.json(body),
            None       => request,
        };
        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(SimError::BackendRejected { endpoint: url, message: status.to_string() });
        }
        Ok(response.json::<ApiResponse>()?)
    }
}

impl Backend for HttpBackend {
    fn name(&self) -> &'static str { "http" }

    fn trigger_emergency(&mut self) -> SimResult<ApiResponse> {
        self.post::<()>("/emergency/trigger", None)
    }

    fn reset_emergency(&mut self) -> SimResult<ApiResponse> {
        self.post::<()>("/emergency/reset", None)
    }

    fn acknowledge_alert(&mut self, alert_id: EntityId) -> SimResult<ApiResponse> {
        self.post::<()>(&format!("/alerts/{alert_id}/acknowledge"), None)
    }

    fn submit_contact(&mut self, form: &ContactForm) -> SimResult<ApiResponse> {
        self.post("/contact", Some(form))
    }
}
