//! Caller quote request.

use crate::serde_util::lenient_i64;
use crate::types::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Protocol assumed when a query names none.
pub const DEFAULT_PROTOCOL: &str = "PMMV5";

fn default_protocol() -> String {
    DEFAULT_PROTOCOL.to_string()
}

/// A quote request as received from the relay.
///
/// `protocol` stays a raw string so that an unrecognized value can be
/// reported back verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_address: Option<String>,
    pub side: Side,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "lenient_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub fee_factor: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uniq_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_addr: Option<String>,
    #[serde(default = "default_protocol")]
    pub protocol: String,
}

impl Query {
    /// A bare query for `base`/`quote` on `side`; other fields unset.
    pub fn new(base: impl Into<String>, quote: impl Into<String>, side: Side) -> Self {
        Self {
            base: Some(base.into()),
            quote: Some(quote.into()),
            base_address: None,
            quote_address: None,
            side,
            amount: None,
            fee_factor: None,
            uniq_id: None,
            user_addr: None,
            protocol: default_protocol(),
        }
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_user(mut self, user_addr: impl Into<String>) -> Self {
        self.user_addr = Some(user_addr.into());
        self
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    pub fn with_fee_factor(mut self, fee_factor: i64) -> Self {
        self.fee_factor = Some(fee_factor);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_query_defaults_protocol() {
        let query: Query =
            serde_json::from_str(r#"{"base":"ETH","quote":"USDT","side":"SELL","amount":0.1}"#)
                .unwrap();
        assert_eq!(query.protocol, DEFAULT_PROTOCOL);
        assert_eq!(query.amount, Some(dec!(0.1)));
        assert_eq!(query.fee_factor, None);
    }

    #[test]
    fn test_query_accepts_string_amount_and_fee_factor() {
        let query: Query = serde_json::from_str(
            r#"{"base":"ETH","quote":"USDT","side":"BUY","amount":"0.1111","feeFactor":"10","protocol":"RFQV1"}"#,
        )
        .unwrap();
        assert_eq!(query.amount, Some(dec!(0.1111)));
        assert_eq!(query.fee_factor, Some(10));
        assert_eq!(query.protocol, "RFQV1");
    }

    #[test]
    fn test_query_serializes_camel_case() {
        let query = Query::new("ETH", "USDT", Side::Buy).with_user("0xabc");
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value["userAddr"], "0xabc");
        assert!(value.get("baseAddress").is_none());
    }
}
