//! Gateway wiring and request handling.

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use alloy::primitives::Address;
use mmsk_core::{Query, SupportedToken};
use mmsk_quoting::{
    check_pairs, check_params, construct_quote_response, normalize, remove_quote_id_prefix,
    DealOrder, DynQuoter, ExceptionOrder, HttpQuoter, IndicativeRate, NotifyAck,
    PairsCheckIssue, QuotingError,
};
use mmsk_registry::{
    ConfigClient, ConfigRegistry, RefreshOutcome, RegistryError, SourceName, Updater,
    UpdaterStatus,
};
use mmsk_signer::{build_signed_order, KeyManager, OrderError, ProtocolContext, SignedOrder};
use mmsk_telemetry::Metrics;
use parking_lot::Mutex;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Reply to a firm order request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderReply {
    pub result: bool,
    pub exchangeable: bool,
    #[serde(flatten)]
    pub order: Option<SignedOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Result<SignedOrder, OrderError>> for NewOrderReply {
    fn from(result: Result<SignedOrder, OrderError>) -> Self {
        match result {
            Ok(order) => Self {
                result: true,
                exchangeable: true,
                order: Some(order),
                kind: None,
                message: None,
            },
            Err(e) => Self {
                result: false,
                exchangeable: false,
                order: None,
                kind: Some(e.kind()),
                message: Some(e.to_string()),
            },
        }
    }
}

/// Reply to an indicative rate request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateReply {
    pub result: bool,
    pub exchangeable: bool,
    #[serde(flatten)]
    pub rate: Option<IndicativeRate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<AppResult<IndicativeRate>> for RateReply {
    fn from(result: AppResult<IndicativeRate>) -> Self {
        match result {
            Ok(rate) => Self {
                result: true,
                exchangeable: true,
                rate: Some(rate),
                message: None,
            },
            Err(AppError::Quoting(QuotingError::Rejected(message))) => Self {
                result: false,
                exchangeable: false,
                rate: None,
                message: Some(message),
            },
            Err(e) => Self {
                result: false,
                exchangeable: false,
                rate: None,
                message: Some(e.to_string()),
            },
        }
    }
}

/// The signing gateway.
///
/// Request handlers only read registry snapshots; the background updaters
/// are the only writers.
pub struct Gateway {
    config: AppConfig,
    registry: ConfigRegistry,
    quoter: DynQuoter,
    keys: Arc<KeyManager>,
    cancel: CancellationToken,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Gateway {
    /// Build the gateway from configuration: load the key, create the HTTP
    /// collaborators and wire the four updaters.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let expected = config
            .wallet_address
            .as_deref()
            .map(|a| {
                Address::from_str(a)
                    .map_err(|e| AppError::Config(format!("Invalid wallet_address {a}: {e}")))
            })
            .transpose()?;
        let keys = KeyManager::load(&config.key.source(), expected)?;

        let signer_address = format!("0x{}", hex::encode(&keys.address()[..]));
        let client = Arc::new(ConfigClient::new(
            &config.exchange_url,
            signer_address,
            config.http_timeout(),
        )?);
        let quoter: DynQuoter =
            Arc::new(HttpQuoter::new(&config.provider_url, config.http_timeout())?);

        let registry = Self::wire_registry(&config, client, quoter.clone());

        info!(
            signer = %keys.address(),
            exchange_url = %config.exchange_url,
            provider_url = %config.provider_url,
            chain_id = config.chain_id,
            "Gateway created"
        );

        Ok(Self::with_parts(config, registry, quoter, keys))
    }

    /// Assemble a gateway from already-built parts.
    pub fn with_parts(
        config: AppConfig,
        registry: ConfigRegistry,
        quoter: DynQuoter,
        keys: KeyManager,
    ) -> Self {
        Self {
            config,
            registry,
            quoter,
            keys: Arc::new(keys),
            cancel: CancellationToken::new(),
            handles: Mutex::new(Vec::new()),
        }
    }

    fn wire_registry(
        config: &AppConfig,
        client: Arc<ConfigClient>,
        quoter: DynQuoter,
    ) -> ConfigRegistry {
        let refresh = &config.refresh;

        let mm_client = client.clone();
        let market_maker = Updater::new(
            SourceName::MarketMakerConfig.as_str(),
            Duration::from_secs(refresh.market_maker_config_secs),
            move || {
                let client = mm_client.clone();
                async move { client.market_maker_config().await }
            },
        );

        let pairs = Updater::new(
            SourceName::Pairs.as_str(),
            Duration::from_secs(refresh.pairs_secs),
            move || {
                let quoter = quoter.clone();
                async move {
                    quoter
                        .get_pairs()
                        .await
                        .map_err(|e| RegistryError::Fetch(e.to_string()))
                }
            },
        );

        let list_client = client.clone();
        let token_list = Updater::new(
            SourceName::TokenList.as_str(),
            Duration::from_secs(refresh.token_list_secs),
            move || {
                let client = list_client.clone();
                async move { client.token_list().await }
            },
        );

        let token_configs = Updater::new(
            SourceName::TokenConfigs.as_str(),
            Duration::from_secs(refresh.token_configs_secs),
            move || {
                let client = client.clone();
                async move { client.token_configs().await }
            },
        );

        ConfigRegistry::new(market_maker, pairs, token_list, token_configs)
            .with_max_config_age(config.max_config_age())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn registry(&self) -> &ConfigRegistry {
        &self.registry
    }

    pub fn signer_address(&self) -> Address {
        self.keys.address()
    }

    /// Refresh every cache once, concurrently.
    pub async fn refresh_all(&self) -> Vec<(SourceName, RefreshOutcome)> {
        self.registry.refresh_all().await
    }

    pub fn statuses(&self) -> Vec<UpdaterStatus> {
        self.registry.statuses()
    }

    /// Start background refresh loops. Call `shutdown` to stop them.
    pub fn start(&self) {
        let handles = self.registry.spawn_all(&self.cancel);
        info!(updaters = handles.len(), "Started cache updaters");
        self.handles.lock().extend(handles);
    }

    /// Stop background refresh loops and wait for them to exit.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let handles: Vec<_> = self.handles.lock().drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Updater task ended abnormally");
            }
        }
        info!("Gateway stopped");
    }

    /// Tokens tradable right now; empty before the first refresh.
    pub fn supported_tokens(&self) -> Vec<SupportedToken> {
        self.registry.snapshot().supported_tokens().to_vec()
    }

    pub fn normalize(&self, query: &Query) -> Query {
        normalize(query, &self.registry.snapshot())
    }

    /// Non-binding rate for display.
    ///
    /// Unsupported pairs and non-positive amounts are refused before the
    /// provider is called.
    pub async fn indicative_rate(&self, query: &Query) -> AppResult<IndicativeRate> {
        let snapshot = self.registry.snapshot();
        let normalized = normalize(query, &snapshot);
        check_params(&normalized, &snapshot, false)
            .map_err(|issue| AppError::InvalidRequest(issue.to_string()))?;

        let timeout = self.config.quote_timeout();

        let quote = tokio::time::timeout(timeout, self.quoter.get_indicative_price(&normalized))
            .await
            .map_err(|_| AppError::Timeout {
                operation: "getIndicativePrice",
                timeout_ms: self.config.timeouts.quote_ms,
            })??;

        Ok(construct_quote_response(&quote, normalized.side)?)
    }

    /// Build and sign a firm order.
    pub async fn new_order(&self, query: &Query) -> Result<SignedOrder, OrderError> {
        let ctx = self.protocol_context();
        build_signed_order(self.keys.signer(), self.quoter.as_ref(), query, &ctx).await
    }

    /// Forward a settlement notification with the market-maker prefix removed.
    pub async fn deal_order(&self, mut deal: DealOrder) -> AppResult<NotifyAck> {
        deal.quote_id = self.strip_quote_id(&deal.quote_id)?;
        info!(quote_id = %deal.quote_id, "Forwarding deal");
        Ok(self.quoter.deal_order(deal).await?)
    }

    /// Forward an exception notification with the market-maker prefix removed.
    pub async fn exception_order(&self, mut exception: ExceptionOrder) -> AppResult<NotifyAck> {
        exception.quote_id = self.strip_quote_id(&exception.quote_id)?;
        warn!(
            quote_id = %exception.quote_id,
            kind = %exception.kind,
            "Forwarding order exception"
        );
        Ok(self.quoter.exception_order(exception).await?)
    }

    /// Validate the provider's pair list against the current token list.
    pub async fn check_pairs(&self) -> Result<(), PairsCheckIssue> {
        check_pairs(self.quoter.as_ref(), &self.registry.snapshot()).await
    }

    /// Process metrics in the Prometheus text format.
    pub fn render_metrics(&self) -> AppResult<String> {
        Ok(Metrics::render()?)
    }

    fn strip_quote_id(&self, quote_id: &str) -> AppResult<String> {
        let snapshot = self.registry.snapshot();
        let mm = snapshot.market_maker()?;
        Ok(remove_quote_id_prefix(&mm.mm_id, quote_id))
    }

    fn protocol_context(&self) -> ProtocolContext {
        ProtocolContext::new(self.registry.snapshot())
            .with_chain_id(self.config.chain_id)
            .with_timeouts(self.config.quote_timeout(), self.config.sign_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_rate_reply_is_a_failure() {
        let reply = RateReply::from(Err(AppError::Quoting(QuotingError::Rejected(
            "no liquidity".to_string(),
        ))));
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["result"], false);
        assert_eq!(value["exchangeable"], false);
        assert_eq!(value["message"], "no liquidity");
    }

    #[test]
    fn test_invalid_rate_request_reply() {
        let reply = RateReply::from(Err(AppError::InvalidRequest(
            "Unsupported pair ETH/DAI".to_string(),
        )));
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["result"], false);
        assert_eq!(value["message"], "Invalid request: Unsupported pair ETH/DAI");
    }

    #[test]
    fn test_failed_order_reply() {
        let reply = NewOrderReply::from(Err(OrderError::UnrecognizedProtocol("PMMV4".into())));
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["result"], false);
        assert_eq!(value["kind"], "protocol");
        assert_eq!(value["message"], "Unrecognized protocol: PMMV4");
        assert!(value.get("order").is_none());
    }
}
