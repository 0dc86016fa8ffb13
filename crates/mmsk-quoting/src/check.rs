//! Preflight check of the provider's pair list.

use crate::quoter::Quoter;
use mmsk_core::SupportedToken;
use mmsk_registry::RegistrySnapshot;
use thiserror::Error;
use tracing::{info, warn};

/// First problem found by `check_pairs`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairsCheckIssue {
    #[error("pairs API request error {0}")]
    RequestFailed(String),

    #[error("pairs API token array is empty")]
    Empty,

    #[error("pairs API pair str must be TokenA/TokenB, got {0}")]
    Malformed(String),

    #[error("integrated supported token list is empty")]
    NoSupportedTokens,

    #[error("integrated supported token list only has one token trade {symbol}-{opposite}")]
    SingleSupportedToken { symbol: String, opposite: String },
}

/// Verify that the provider lists well-formed pairs and that at least two
/// tokens end up tradable.
pub async fn check_pairs(
    quoter: &dyn Quoter,
    snapshot: &RegistrySnapshot,
) -> Result<(), PairsCheckIssue> {
    let result = run_checks(quoter, snapshot).await;
    match &result {
        Ok(()) => info!(
            supported_tokens = snapshot.supported_tokens().len(),
            "Pairs check passed"
        ),
        Err(issue) => warn!(issue = %issue, "Pairs check failed"),
    }
    result
}

async fn run_checks(
    quoter: &dyn Quoter,
    snapshot: &RegistrySnapshot,
) -> Result<(), PairsCheckIssue> {
    let pairs = quoter
        .get_pairs()
        .await
        .map_err(|e| PairsCheckIssue::RequestFailed(e.to_string()))?;

    if pairs.is_empty() {
        return Err(PairsCheckIssue::Empty);
    }
    if let Some(bad) = pairs.iter().find(|p| !p.contains('/')) {
        return Err(PairsCheckIssue::Malformed(bad.clone()));
    }

    check_supported_tokens(snapshot.supported_tokens())
}

/// At least two tokens must be tradable.
fn check_supported_tokens(tokens: &[SupportedToken]) -> Result<(), PairsCheckIssue> {
    match tokens {
        [] => Err(PairsCheckIssue::NoSupportedTokens),
        [only] => Err(PairsCheckIssue::SingleSupportedToken {
            symbol: only.symbol().to_string(),
            opposite: only.opposites.first().cloned().unwrap_or_default(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quoter::MockQuoter;
    use mmsk_core::TokenMeta;

    fn token(symbol: &str) -> TokenMeta {
        TokenMeta {
            symbol: symbol.to_string(),
            contract_address: format!("0x{symbol}"),
            decimal: 18,
            precision: 4,
            min_trade_amount: None,
            max_trade_amount: None,
        }
    }

    fn snapshot(pairs: &[&str], symbols: &[&str]) -> RegistrySnapshot {
        RegistrySnapshot::new(
            None,
            pairs.iter().map(|s| s.to_string()).collect(),
            symbols.iter().map(|s| token(s)).collect(),
            vec![],
        )
    }

    #[tokio::test]
    async fn test_check_passes() {
        let quoter = MockQuoter::new().with_pairs(&["ETH/USDT"]);
        let snapshot = snapshot(&["ETH/USDT"], &["ETH", "USDT"]);
        assert_eq!(check_pairs(&quoter, &snapshot).await, Ok(()));
    }

    #[tokio::test]
    async fn test_check_request_error() {
        let quoter = MockQuoter::new();
        quoter.set_pairs_error("timeout");
        let snapshot = snapshot(&[], &[]);
        let issue = check_pairs(&quoter, &snapshot).await.unwrap_err();
        assert_eq!(issue.to_string(), "pairs API request error Provider error: timeout");
    }

    #[tokio::test]
    async fn test_check_empty_and_malformed() {
        let snapshot = snapshot(&[], &[]);

        let quoter = MockQuoter::new();
        assert_eq!(
            check_pairs(&quoter, &snapshot).await,
            Err(PairsCheckIssue::Empty)
        );

        quoter.set_pairs(&["ETH/USDT", "ETHUSDT"]);
        assert_eq!(
            check_pairs(&quoter, &snapshot).await,
            Err(PairsCheckIssue::Malformed("ETHUSDT".to_string()))
        );
    }

    #[tokio::test]
    async fn test_check_supported_token_counts() {
        let quoter = MockQuoter::new().with_pairs(&["ETH/USDT"]);

        let none = snapshot(&["ETH/USDT"], &["DAI"]);
        assert_eq!(
            check_pairs(&quoter, &none).await,
            Err(PairsCheckIssue::NoSupportedTokens)
        );
    }

    #[test]
    fn test_single_supported_token_rejected() {
        let only = SupportedToken {
            meta: token("ETH"),
            opposites: vec!["USDT".to_string()],
        };
        let issue = check_supported_tokens(std::slice::from_ref(&only)).unwrap_err();
        assert_eq!(
            issue,
            PairsCheckIssue::SingleSupportedToken {
                symbol: "ETH".to_string(),
                opposite: "USDT".to_string(),
            }
        );

        let usdt = SupportedToken {
            meta: token("USDT"),
            opposites: vec!["ETH".to_string()],
        };
        assert_eq!(check_supported_tokens(&[only, usdt]), Ok(()));
    }

    #[tokio::test]
    async fn test_derived_tokens_never_leave_a_single_one() {
        let quoter = MockQuoter::new().with_pairs(&["ETH/ETH", "ETH/USDT"]);

        // A self pair adds nothing and USDT is unlisted, so ETH has no opposite.
        let snapshot = snapshot(&["ETH/ETH", "ETH/USDT"], &["ETH"]);
        assert_eq!(
            check_pairs(&quoter, &snapshot).await,
            Err(PairsCheckIssue::NoSupportedTokens)
        );
    }

    #[test]
    fn test_single_token_message() {
        let issue = PairsCheckIssue::SingleSupportedToken {
            symbol: "ETH".to_string(),
            opposite: "USDT".to_string(),
        };
        assert_eq!(
            issue.to_string(),
            "integrated supported token list only has one token trade ETH-USDT"
        );
    }
}
