//! Price quote returned by the quoting provider.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_exchangeable() -> bool {
    true
}

/// Indicative or firm price from the provider.
///
/// A missing `exchangeable` flag counts as exchangeable; only an explicit
/// `false` rejects the trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default = "default_exchangeable")]
    pub exchangeable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maker_address: Option<String>,
    /// Present on firm quotes only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_id: Option<String>,
}

impl PriceQuote {
    /// An exchangeable firm quote at `price`.
    pub fn firm(price: Decimal, quote_id: impl Into<String>) -> Self {
        Self {
            min_amount: None,
            max_amount: None,
            price: Some(price),
            exchangeable: true,
            message: None,
            maker_address: None,
            quote_id: Some(quote_id.into()),
        }
    }

    /// Price that can actually be traded on, if any.
    pub fn usable_price(&self) -> Option<Decimal> {
        if !self.exchangeable {
            return None;
        }
        self.price.filter(|p| *p > Decimal::ZERO)
    }
}
