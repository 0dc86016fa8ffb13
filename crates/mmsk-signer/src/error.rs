//! Order construction error types.

use mmsk_quoting::QuotingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Unrecognized protocol: {0}")]
    UnrecognizedProtocol(String),

    #[error("Invalid order request: {0}")]
    Validation(String),

    /// The provider declined to trade; displayable verbatim.
    #[error("{0}")]
    Rejected(String),

    #[error("Configuration unavailable: {0}")]
    ConfigUnavailable(String),

    #[error("Quoting provider error: {0}")]
    Quoting(#[from] QuotingError),

    #[error("Signing failed: {0}")]
    Signing(#[from] alloy::signers::Error),

    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },
}

impl OrderError {
    /// Whether the request cannot succeed until the gateway itself changes
    /// (configuration, signer, or protocol support), as opposed to a
    /// per-request problem the caller can retry or rephrase.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            OrderError::UnrecognizedProtocol(_)
                | OrderError::ConfigUnavailable(_)
                | OrderError::Signing(_)
        )
    }

    /// Stable label for metrics and replies.
    pub fn kind(&self) -> &'static str {
        match self {
            OrderError::UnrecognizedProtocol(_) => "protocol",
            OrderError::Validation(_) => "validation",
            OrderError::Rejected(_) => "rejected",
            OrderError::ConfigUnavailable(_) => "config",
            OrderError::Quoting(_) => "quoting",
            OrderError::Signing(_) => "signing",
            OrderError::Timeout { .. } => "timeout",
        }
    }
}

pub type OrderResult<T> = Result<T, OrderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(OrderError::UnrecognizedProtocol("PMMV4".into()).is_fatal());
        assert!(OrderError::ConfigUnavailable("marketMakerConfig".into()).is_fatal());
        assert!(!OrderError::Rejected("no liquidity".into()).is_fatal());
        assert!(!OrderError::Validation("amount is required".into()).is_fatal());
        assert!(!OrderError::Timeout {
            operation: "getPrice",
            timeout_ms: 100
        }
        .is_fatal());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            OrderError::UnrecognizedProtocol("PMMV4".into()).to_string(),
            "Unrecognized protocol: PMMV4"
        );
        assert_eq!(
            OrderError::Rejected("insufficient inventory".into()).to_string(),
            "insufficient inventory"
        );
    }
}
