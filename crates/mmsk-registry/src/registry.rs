//! Named collection of cache updaters and the snapshots read from it.

use crate::error::Unavailable;
use crate::tokens;
use crate::updater::{RefreshOutcome, Updater, UpdaterStatus};
use mmsk_core::{MarketMakerConfig, SupportedToken, TokenFeeConfig, TokenMeta};
use mmsk_telemetry::Metrics;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Logical names of the cached sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceName {
    MarketMakerConfig,
    Pairs,
    TokenList,
    TokenConfigs,
}

impl SourceName {
    pub const ALL: [SourceName; 4] = [
        SourceName::MarketMakerConfig,
        SourceName::Pairs,
        SourceName::TokenList,
        SourceName::TokenConfigs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceName::MarketMakerConfig => "marketMakerConfig",
            SourceName::Pairs => "pairs",
            SourceName::TokenList => "tokenList",
            SourceName::TokenConfigs => "tokenConfigs",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four configuration caches the signing path depends on.
#[derive(Debug, Clone)]
pub struct ConfigRegistry {
    market_maker: Arc<Updater<MarketMakerConfig>>,
    pairs: Arc<Updater<Vec<String>>>,
    token_list: Arc<Updater<Vec<TokenMeta>>>,
    token_configs: Arc<Updater<Vec<TokenFeeConfig>>>,
    max_config_age: Option<Duration>,
}

impl ConfigRegistry {
    pub fn new(
        market_maker: Updater<MarketMakerConfig>,
        pairs: Updater<Vec<String>>,
        token_list: Updater<Vec<TokenMeta>>,
        token_configs: Updater<Vec<TokenFeeConfig>>,
    ) -> Self {
        Self {
            market_maker: Arc::new(market_maker),
            pairs: Arc::new(pairs),
            token_list: Arc::new(token_list),
            token_configs: Arc::new(token_configs),
            max_config_age: None,
        }
    }

    /// Registry over fixed values, with no background fetching.
    pub fn fixed(
        market_maker: Option<MarketMakerConfig>,
        pairs: Vec<String>,
        token_list: Vec<TokenMeta>,
        token_configs: Vec<TokenFeeConfig>,
    ) -> Self {
        let name = SourceName::MarketMakerConfig.as_str();
        let market_maker = match market_maker {
            Some(config) => Updater::fixed(name, config),
            None => Updater::empty(name),
        };

        Self::new(
            market_maker,
            Updater::fixed(SourceName::Pairs.as_str(), pairs),
            Updater::fixed(SourceName::TokenList.as_str(), token_list),
            Updater::fixed(SourceName::TokenConfigs.as_str(), token_configs),
        )
    }

    /// Treat a market-maker config older than `max_age` as unavailable.
    pub fn with_max_config_age(mut self, max_age: Option<Duration>) -> Self {
        self.max_config_age = max_age;
        self
    }

    pub fn market_maker(&self) -> &Arc<Updater<MarketMakerConfig>> {
        &self.market_maker
    }

    pub fn pairs(&self) -> &Arc<Updater<Vec<String>>> {
        &self.pairs
    }

    pub fn token_list(&self) -> &Arc<Updater<Vec<TokenMeta>>> {
        &self.token_list
    }

    pub fn token_configs(&self) -> &Arc<Updater<Vec<TokenFeeConfig>>> {
        &self.token_configs
    }

    /// Status of one source by name.
    pub fn status(&self, name: SourceName) -> UpdaterStatus {
        match name {
            SourceName::MarketMakerConfig => self.market_maker.status(),
            SourceName::Pairs => self.pairs.status(),
            SourceName::TokenList => self.token_list.status(),
            SourceName::TokenConfigs => self.token_configs.status(),
        }
    }

    /// Status of every source.
    pub fn statuses(&self) -> Vec<UpdaterStatus> {
        SourceName::ALL.iter().map(|name| self.status(*name)).collect()
    }

    /// Refresh every source once, concurrently.
    pub async fn refresh_all(&self) -> Vec<(SourceName, RefreshOutcome)> {
        let (market_maker, pairs, token_list, token_configs) = tokio::join!(
            self.market_maker.refresh(),
            self.pairs.refresh(),
            self.token_list.refresh(),
            self.token_configs.refresh(),
        );

        vec![
            (SourceName::MarketMakerConfig, market_maker),
            (SourceName::Pairs, pairs),
            (SourceName::TokenList, token_list),
            (SourceName::TokenConfigs, token_configs),
        ]
    }

    /// Start every refresh loop.
    pub fn spawn_all(&self, cancel: &CancellationToken) -> Vec<JoinHandle<()>> {
        info!("Starting configuration updaters");
        vec![
            self.market_maker.spawn(cancel.child_token()),
            self.pairs.spawn(cancel.child_token()),
            self.token_list.spawn(cancel.child_token()),
            self.token_configs.spawn(cancel.child_token()),
        ]
    }

    /// Take a consistent point-in-time view of every cache.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let name = SourceName::MarketMakerConfig.as_str();
        let market_maker = match self.market_maker.cached_with_age() {
            None => Err(Unavailable::NotLoaded(name.to_string())),
            Some((_, age)) if self.max_config_age.is_some_and(|max| age > max) => {
                Err(Unavailable::Stale {
                    name: name.to_string(),
                    age_secs: age.as_secs(),
                })
            }
            Some((config, _)) => Ok(config),
        };

        let snapshot = RegistrySnapshot::from_parts(
            market_maker,
            self.pairs.cached().unwrap_or_default(),
            self.token_list.cached().unwrap_or_default(),
            self.token_configs.cached().unwrap_or_default(),
        );
        Metrics::supported_tokens(snapshot.supported_tokens().len());
        snapshot
    }
}

/// Immutable view of the registry used for one request.
///
/// Empty lists stand in for sources that have not loaded yet. The supported
/// tokens are derived once when the snapshot is taken.
#[derive(Debug, Clone)]
pub struct RegistrySnapshot {
    market_maker: Result<Arc<MarketMakerConfig>, Unavailable>,
    pairs: Arc<Vec<String>>,
    token_list: Arc<Vec<TokenMeta>>,
    token_configs: Arc<Vec<TokenFeeConfig>>,
    supported: Arc<Vec<SupportedToken>>,
}

impl RegistrySnapshot {
    /// Build a snapshot directly from values.
    pub fn new(
        market_maker: Option<MarketMakerConfig>,
        pairs: Vec<String>,
        token_list: Vec<TokenMeta>,
        token_configs: Vec<TokenFeeConfig>,
    ) -> Self {
        let market_maker = market_maker.map(Arc::new).ok_or_else(|| {
            Unavailable::NotLoaded(SourceName::MarketMakerConfig.as_str().to_string())
        });
        Self::from_parts(
            market_maker,
            Arc::new(pairs),
            Arc::new(token_list),
            Arc::new(token_configs),
        )
    }

    fn from_parts(
        market_maker: Result<Arc<MarketMakerConfig>, Unavailable>,
        pairs: Arc<Vec<String>>,
        token_list: Arc<Vec<TokenMeta>>,
        token_configs: Arc<Vec<TokenFeeConfig>>,
    ) -> Self {
        let supported = Arc::new(tokens::supported_tokens(&pairs, &token_list));
        Self {
            market_maker,
            pairs,
            token_list,
            token_configs,
            supported,
        }
    }

    /// Market-maker config, unless it never loaded or is stale.
    pub fn market_maker(&self) -> Result<&MarketMakerConfig, Unavailable> {
        self.market_maker.as_deref().map_err(Clone::clone)
    }

    pub fn pairs(&self) -> &[String] {
        &self.pairs
    }

    pub fn token_list(&self) -> &[TokenMeta] {
        &self.token_list
    }

    pub fn token_configs(&self) -> &[TokenFeeConfig] {
        &self.token_configs
    }

    pub fn supported_tokens(&self) -> &[SupportedToken] {
        &self.supported
    }

    pub fn find_token(&self, symbol: &str) -> Option<&SupportedToken> {
        tokens::find_by_symbol(&self.supported, symbol)
    }

    pub fn find_token_by_address(&self, address: &str) -> Option<&SupportedToken> {
        tokens::find_by_address(&self.supported, address)
    }

    pub fn is_supported_pair(&self, base: &str, quote: &str) -> bool {
        tokens::is_supported_pair(&self.supported, base, quote)
    }

    /// Per-token fee override for `symbol`, matched case-insensitively.
    pub fn token_fee_factor(&self, symbol: &str) -> Option<i64> {
        self.token_configs
            .iter()
            .find(|c| c.symbol.eq_ignore_ascii_case(symbol))
            .and_then(|c| c.fee_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;

    fn mm_config() -> MarketMakerConfig {
        serde_json::from_value(serde_json::json!({
            "mmId": 1,
            "mmProxyContractAddress": "0x86b9f429c3ef44c599eb560eb531a0e3f2e36f64",
            "exchangeContractAddress": "0x30589010550762d2f0d06f650d8e8b6ade6dbf4b",
            "wethContractAddress": "0xd0a1e359811322d97991e03f863a0c30c2cf029c",
            "orderExpirationSeconds": 600,
            "feeFactor": 30
        }))
        .unwrap()
    }

    fn token(symbol: &str, address: &str, decimal: u32) -> TokenMeta {
        TokenMeta {
            symbol: symbol.to_string(),
            contract_address: address.to_string(),
            decimal,
            precision: 4,
            min_trade_amount: None,
            max_trade_amount: None,
        }
    }

    fn token_list() -> Vec<TokenMeta> {
        vec![
            token("ETH", mmsk_core::ZERO_ADDRESS, 18),
            token("USDT", "0xdac17f958d2ee523a2206206994597c13d831ec7", 6),
        ]
    }

    #[test]
    fn test_snapshot_from_fixed_registry() {
        let registry = ConfigRegistry::fixed(
            Some(mm_config()),
            vec!["USDT/ETH".to_string()],
            token_list(),
            vec![TokenFeeConfig {
                symbol: "usdt".to_string(),
                fee_factor: Some(20),
            }],
        );

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.market_maker().unwrap().mm_id, "1");
        assert_eq!(snapshot.supported_tokens().len(), 2);
        assert!(snapshot.is_supported_pair("ETH", "USDT"));
        assert_eq!(snapshot.token_fee_factor("USDT"), Some(20));
        assert_eq!(snapshot.token_fee_factor("ETH"), None);
    }

    #[test]
    fn test_snapshot_without_market_maker_config() {
        let registry = ConfigRegistry::fixed(None, vec![], vec![], vec![]);
        let snapshot = registry.snapshot();

        assert_eq!(
            snapshot.market_maker().unwrap_err(),
            Unavailable::NotLoaded("marketMakerConfig".to_string())
        );
        assert!(snapshot.supported_tokens().is_empty());
    }

    #[tokio::test]
    async fn test_stale_market_maker_config_is_unavailable() {
        let registry = ConfigRegistry::fixed(Some(mm_config()), vec![], vec![], vec![])
            .with_max_config_age(Some(Duration::from_millis(1)));

        tokio::time::sleep(Duration::from_millis(20)).await;

        let err = registry.snapshot().market_maker().unwrap_err();
        assert!(matches!(err, Unavailable::Stale { .. }));
        assert!(err.to_string().contains("marketMakerConfig is stale"));
    }

    #[tokio::test]
    async fn test_unset_caches_degrade_to_empty() {
        let registry = ConfigRegistry::new(
            Updater::new("marketMakerConfig", Duration::from_secs(60), || async {
                Err(RegistryError::Fetch("down".to_string()))
            }),
            Updater::new("pairs", Duration::from_secs(60), || async {
                Ok(vec!["ETH/USDT".to_string()])
            }),
            Updater::new("tokenList", Duration::from_secs(60), || async {
                Err(RegistryError::Fetch("down".to_string()))
            }),
            Updater::fixed("tokenConfigs", vec![]),
        );

        let outcomes = registry.refresh_all().await;
        assert_eq!(
            outcomes,
            vec![
                (SourceName::MarketMakerConfig, RefreshOutcome::Failed),
                (SourceName::Pairs, RefreshOutcome::Updated),
                (SourceName::TokenList, RefreshOutcome::Failed),
                (SourceName::TokenConfigs, RefreshOutcome::Skipped),
            ]
        );

        let snapshot = registry.snapshot();
        assert!(snapshot.market_maker().is_err());
        assert_eq!(snapshot.pairs().len(), 1);
        assert!(snapshot.supported_tokens().is_empty());

        let status = registry.status(SourceName::TokenList);
        assert!(!status.loaded);
        assert!(status.last_error.is_some());
    }

    #[test]
    fn test_source_name_round_trip() {
        for name in SourceName::ALL {
            assert_eq!(SourceName::parse(name.as_str()), Some(name));
        }
        assert_eq!(SourceName::parse("unknown"), None);
    }
}
