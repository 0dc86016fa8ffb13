//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Key error: {0}")]
    Key(#[from] mmsk_signer::KeyError),

    #[error("Registry error: {0}")]
    Registry(#[from] mmsk_registry::RegistryError),

    #[error("Configuration unavailable: {0}")]
    Unavailable(#[from] mmsk_registry::Unavailable),

    #[error("Quoting error: {0}")]
    Quoting(#[from] mmsk_quoting::QuotingError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] mmsk_telemetry::TelemetryError),

    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

pub type AppResult<T> = Result<T, AppError>;
