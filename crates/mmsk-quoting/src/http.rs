//! HTTP quoter talking to the market maker's pricing service.
//!
//! Endpoints, relative to the provider base URL:
//! - `GET /pairs` returns `{"pairs": ["BASE/QUOTE", ...]}`
//! - `GET /indicativePrice` and `GET /price` take the query as URL parameters
//! - `POST /deal` and `POST /exception` take JSON notifications

use crate::error::{QuotingError, QuotingResult};
use crate::quoter::{DealOrder, ExceptionOrder, NotifyAck, Quoter};
use mmsk_core::{PriceQuote, Query};
use mmsk_registry::BoxFuture;
use mmsk_telemetry::Metrics;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct PairsResponse {
    #[serde(default)]
    pairs: Vec<String>,
}

/// Quoter backed by the provider's HTTP API.
pub struct HttpQuoter {
    client: Client,
    endpoint: String,
}

impl HttpQuoter {
    /// Create a new HTTP quoter.
    ///
    /// # Arguments
    /// * `endpoint` - provider base URL, e.g. `http://localhost:8000`
    /// * `timeout` - per-request timeout
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> QuotingResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QuotingError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: &'static str,
        request: RequestBuilder,
    ) -> QuotingResult<T> {
        let started = Instant::now();
        let result = Self::execute(request).await;
        Metrics::quoter_latency(method, started.elapsed().as_secs_f64() * 1_000.0);
        debug!(method, ok = result.is_ok(), "Quoting provider call finished");
        result
    }

    async fn execute<T: DeserializeOwned>(request: RequestBuilder) -> QuotingResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| QuotingError::HttpClient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QuotingError::Provider(format!("HTTP {status}: {body}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| QuotingError::HttpClient(format!("Failed to read response: {e}")))?;

        Ok(serde_json::from_slice(&body)?)
    }
}

impl Quoter for HttpQuoter {
    fn get_pairs(&self) -> BoxFuture<'_, QuotingResult<Vec<String>>> {
        Box::pin(async move {
            let request = self.client.get(self.url("pairs"));
            let response: PairsResponse = self.send("pairs", request).await?;
            Ok(response.pairs)
        })
    }

    fn get_indicative_price<'a>(
        &'a self,
        query: &'a Query,
    ) -> BoxFuture<'a, QuotingResult<PriceQuote>> {
        Box::pin(async move {
            let request = self.client.get(self.url("indicativePrice")).query(query);
            self.send("indicativePrice", request).await
        })
    }

    fn get_price<'a>(&'a self, query: &'a Query) -> BoxFuture<'a, QuotingResult<PriceQuote>> {
        Box::pin(async move {
            let request = self.client.get(self.url("price")).query(query);
            self.send("price", request).await
        })
    }

    fn deal_order(&self, deal: DealOrder) -> BoxFuture<'_, QuotingResult<NotifyAck>> {
        Box::pin(async move {
            let request = self.client.post(self.url("deal")).json(&deal);
            self.send("deal", request).await
        })
    }

    fn exception_order(
        &self,
        exception: ExceptionOrder,
    ) -> BoxFuture<'_, QuotingResult<NotifyAck>> {
        Box::pin(async move {
            let request = self.client.post(self.url("exception")).json(&exception);
            self.send("exception", request).await
        })
    }
}
