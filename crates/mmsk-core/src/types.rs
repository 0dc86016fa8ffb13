//! Configuration and token data shared across the gateway.

use crate::error::CoreError;
use crate::serde_util::{lenient_i64, string_or_number};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Symbol of the chain's native asset. Orders carry the wrapped asset instead.
pub const NATIVE_TOKEN_SYMBOL: &str = "ETH";

/// The null address, used by token lists for the native asset.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Trade direction from the taker's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Taker buys base, market maker delivers base.
    Buy,
    /// Taker sells base, market maker delivers quote.
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order protocol versions this gateway can sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "PMMV5")]
    PmmV5,
    #[serde(rename = "RFQV1")]
    RfqV1,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::PmmV5 => "PMMV5",
            Protocol::RfqV1 => "RFQV1",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PMMV5" => Ok(Protocol::PmmV5),
            "RFQV1" => Ok(Protocol::RfqV1),
            other => Err(CoreError::UnrecognizedProtocol(other.to_string())),
        }
    }
}

/// Token metadata as published by the token-list source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMeta {
    pub symbol: String,
    pub contract_address: String,
    /// On-chain decimal count.
    pub decimal: u32,
    /// Display precision used for fee-adjusted amounts.
    pub precision: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_trade_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_trade_amount: Option<Decimal>,
}

impl TokenMeta {
    /// Whether this entry denotes the native asset.
    pub fn is_native(&self) -> bool {
        self.symbol.eq_ignore_ascii_case(NATIVE_TOKEN_SYMBOL)
            || self.contract_address.eq_ignore_ascii_case(ZERO_ADDRESS)
    }
}

/// A token with the symbols it can currently be traded against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportedToken {
    #[serde(flatten)]
    pub meta: TokenMeta,
    pub opposites: Vec<String>,
}

impl SupportedToken {
    #[inline]
    pub fn symbol(&self) -> &str {
        &self.meta.symbol
    }

    #[inline]
    pub fn contract_address(&self) -> &str {
        &self.meta.contract_address
    }

    pub fn can_trade_against(&self, symbol: &str) -> bool {
        self.opposites.iter().any(|o| o == symbol)
    }
}

/// Per-token fee override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenFeeConfig {
    pub symbol: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub fee_factor: Option<i64>,
}

/// Contract roles of the v5 deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressBook {
    #[serde(rename = "Tokenlon", default)]
    pub tokenlon: String,
    /// PMM settlement proxy; taker and sender of PMMV5 orders.
    #[serde(rename = "PMM", default)]
    pub pmm: String,
    #[serde(rename = "AMMWrapper", default)]
    pub amm_wrapper: String,
    /// RFQ router; verifying contract of RFQV1 digests.
    #[serde(rename = "RFQ", default)]
    pub rfq: String,
}

/// Market-maker configuration served by the exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketMakerConfig {
    #[serde(deserialize_with = "string_or_number")]
    pub mm_id: String,
    pub mm_proxy_contract_address: String,
    #[serde(default)]
    pub tokenlon_exchange_contract_address: String,
    pub exchange_contract_address: String,
    #[serde(default)]
    pub user_proxy_contract_address: String,
    pub weth_contract_address: String,
    pub order_expiration_seconds: u64,
    /// Default fee factor in basis points.
    #[serde(default, deserialize_with = "lenient_i64")]
    pub fee_factor: Option<i64>,
    #[serde(rename = "addressBookV5", default)]
    pub address_book: AddressBook,
}
