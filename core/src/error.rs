use crate::types::EntityId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend rejected {endpoint}: {message}")]
    BackendRejected {
        endpoint: String,
        message:  String,
    },

    #[error("Emergency already active")]
    EmergencyAlreadyActive,

    #[error("Unknown checkpoint '{id}'")]
    UnknownCheckpoint { id: String },

    #[error("Alert {id} not found")]
    AlertNotFound { id: EntityId },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
