//! Quoting error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuotingError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Provider error: {0}")]
    Provider(String),

    /// The provider declined to trade; the message is displayable verbatim.
    #[error("{0}")]
    Rejected(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type QuotingResult<T> = Result<T, QuotingError>;
