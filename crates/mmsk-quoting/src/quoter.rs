//! Quoting provider trait.
//!
//! The provider is the market maker's own pricing service. This trait keeps
//! the transport out of the signing path so that tests can inject prices.

use crate::error::{QuotingError, QuotingResult};
use mmsk_core::{PriceQuote, Query};
use mmsk_registry::BoxFuture;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Settlement notification for a filled order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealOrder {
    pub maker_token: String,
    pub taker_token: String,
    pub maker_token_amount: Decimal,
    pub taker_token_amount: Decimal,
    pub quote_id: String,
    pub timestamp: u64,
}

/// Notification for an order that failed or settled abnormally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionOrder {
    pub maker_token: String,
    pub taker_token: String,
    pub maker_token_amount: Decimal,
    pub taker_token_amount: Decimal,
    pub quote_id: String,
    pub timestamp: u64,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Provider acknowledgement of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyAck {
    pub result: bool,
}

/// External price provider.
pub trait Quoter: Send + Sync {
    /// Tradable pairs as `"BASE/QUOTE"` strings.
    fn get_pairs(&self) -> BoxFuture<'_, QuotingResult<Vec<String>>>;

    /// Non-binding price for display.
    fn get_indicative_price<'a>(&'a self, query: &'a Query)
        -> BoxFuture<'a, QuotingResult<PriceQuote>>;

    /// Firm price carrying a quote id.
    fn get_price<'a>(&'a self, query: &'a Query) -> BoxFuture<'a, QuotingResult<PriceQuote>>;

    fn deal_order(&self, deal: DealOrder) -> BoxFuture<'_, QuotingResult<NotifyAck>>;

    fn exception_order(&self, exception: ExceptionOrder)
        -> BoxFuture<'_, QuotingResult<NotifyAck>>;
}

/// Arc wrapper for Quoter trait objects.
pub type DynQuoter = Arc<dyn Quoter>;

/// Mock quoter for testing.
#[derive(Debug)]
pub struct MockQuoter {
    pairs: Mutex<Result<Vec<String>, String>>,
    price: Mutex<Option<PriceQuote>>,
    delay: Mutex<Duration>,
    price_requests: Mutex<Vec<Query>>,
    deals: Mutex<Vec<DealOrder>>,
    exceptions: Mutex<Vec<ExceptionOrder>>,
}

impl Default for MockQuoter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockQuoter {
    /// Create a mock with no pairs and no price.
    pub fn new() -> Self {
        Self {
            pairs: Mutex::new(Ok(Vec::new())),
            price: Mutex::new(None),
            delay: Mutex::new(Duration::ZERO),
            price_requests: Mutex::new(Vec::new()),
            deals: Mutex::new(Vec::new()),
            exceptions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_pairs(self, pairs: &[&str]) -> Self {
        self.set_pairs(pairs);
        self
    }

    pub fn with_price(self, quote: PriceQuote) -> Self {
        self.set_price(Some(quote));
        self
    }

    pub fn set_pairs(&self, pairs: &[&str]) {
        *self.pairs.lock() = Ok(pairs.iter().map(|s| s.to_string()).collect());
    }

    /// Make `get_pairs` fail with `message`.
    pub fn set_pairs_error(&self, message: impl Into<String>) {
        *self.pairs.lock() = Err(message.into());
    }

    /// Quote returned by both price methods; `None` makes them fail.
    pub fn set_price(&self, quote: Option<PriceQuote>) {
        *self.price.lock() = quote;
    }

    /// Delay applied before each price response.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    /// Queries received by the price methods.
    pub fn price_requests(&self) -> Vec<Query> {
        self.price_requests.lock().clone()
    }

    pub fn deals(&self) -> Vec<DealOrder> {
        self.deals.lock().clone()
    }

    pub fn exceptions(&self) -> Vec<ExceptionOrder> {
        self.exceptions.lock().clone()
    }

    async fn respond(&self, query: &Query) -> QuotingResult<PriceQuote> {
        self.price_requests.lock().push(query.clone());
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.price
            .lock()
            .clone()
            .ok_or_else(|| QuotingError::Provider("no price configured".to_string()))
    }
}

impl Quoter for MockQuoter {
    fn get_pairs(&self) -> BoxFuture<'_, QuotingResult<Vec<String>>> {
        Box::pin(async move { self.pairs.lock().clone().map_err(QuotingError::Provider) })
    }

    fn get_indicative_price<'a>(
        &'a self,
        query: &'a Query,
    ) -> BoxFuture<'a, QuotingResult<PriceQuote>> {
        Box::pin(async move {
            let mut quote = self.respond(query).await?;
            quote.quote_id = None;
            Ok(quote)
        })
    }

    fn get_price<'a>(&'a self, query: &'a Query) -> BoxFuture<'a, QuotingResult<PriceQuote>> {
        Box::pin(self.respond(query))
    }

    fn deal_order(&self, deal: DealOrder) -> BoxFuture<'_, QuotingResult<NotifyAck>> {
        Box::pin(async move {
            self.deals.lock().push(deal);
            Ok(NotifyAck { result: true })
        })
    }

    fn exception_order(
        &self,
        exception: ExceptionOrder,
    ) -> BoxFuture<'_, QuotingResult<NotifyAck>> {
        Box::pin(async move {
            self.exceptions.lock().push(exception);
            Ok(NotifyAck { result: true })
        })
    }
}
