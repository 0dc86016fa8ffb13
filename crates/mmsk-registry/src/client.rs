//! JSON-RPC client for the exchange's market-maker configuration service.
//!
//! Fetches the market-maker config, the token list and per-token fee
//! overrides that feed the registry's updaters.

use crate::error::{RegistryError, RegistryResult};
use mmsk_core::{MarketMakerConfig, TokenFeeConfig, TokenMeta};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct RpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignerParams<'a> {
    signer_addr: &'a str,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Client for the exchange configuration RPC endpoint.
pub struct ConfigClient {
    client: Client,
    url: String,
    signer_address: String,
    next_id: AtomicU64,
}

impl ConfigClient {
    /// Create a new config client.
    ///
    /// # Arguments
    /// * `url` - JSON-RPC endpoint of the exchange
    /// * `signer_address` - address the market maker signs with; identifies it to the exchange
    /// * `timeout` - per-request timeout
    pub fn new(
        url: impl Into<String>,
        signer_address: impl Into<String>,
        timeout: Duration,
    ) -> RegistryResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RegistryError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            signer_address: signer_address.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch this market maker's configuration.
    pub async fn market_maker_config(&self) -> RegistryResult<MarketMakerConfig> {
        self.call(
            "getMarketMakerConfig",
            [SignerParams {
                signer_addr: &self.signer_address,
            }],
        )
        .await
    }

    /// Fetch the exchange's token list.
    pub async fn token_list(&self) -> RegistryResult<Vec<TokenMeta>> {
        self.call("getTokenList", [(); 0]).await
    }

    /// Fetch per-token fee overrides for this market maker.
    pub async fn token_configs(&self) -> RegistryResult<Vec<TokenFeeConfig>> {
        self.call(
            "getTokenConfigsForMM",
            [SignerParams {
                signer_addr: &self.signer_address,
            }],
        )
        .await
    }

    async fn call<P, T>(&self, method: &str, params: P) -> RegistryResult<T>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        debug!(url = %self.url, method, "Calling exchange RPC");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RegistryError::HttpClient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::HttpClient(format!("HTTP {status}: {body}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RegistryError::HttpClient(format!("Failed to read response: {e}")))?;

        parse_rpc_response(method, &body)
    }
}

fn parse_rpc_response<T: DeserializeOwned>(method: &str, body: &[u8]) -> RegistryResult<T> {
    let response: RpcResponse<T> = serde_json::from_slice(body)?;

    if let Some(error) = response.error {
        return Err(RegistryError::Rpc {
            code: error.code,
            message: error.message,
        });
    }

    response
        .result
        .ok_or_else(|| RegistryError::Fetch(format!("{method} returned no result")))
}
