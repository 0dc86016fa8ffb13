//! Indicative rate responses.

use crate::error::{QuotingError, QuotingResult};
use mmsk_core::{PriceQuote, Rate, Side};
use rust_decimal::Decimal;
use serde::Serialize;

/// Rate shown to the taker before they commit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicativeRate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<Decimal>,
    pub rate: Rate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maker_address: Option<String>,
}

/// Message returned to the caller when a quote cannot be traded.
pub fn rejection_message(quote: &PriceQuote) -> String {
    match quote.message.as_deref() {
        Some(message) if !message.is_empty() => message.to_string(),
        _ => {
            let body = serde_json::to_string(quote).unwrap_or_else(|_| format!("{quote:?}"));
            format!("Can't support this trade: {body}")
        }
    }
}

/// Turn a provider price into the rate for `side`.
///
/// Fails with `Rejected` when the quote is not exchangeable or has no
/// positive price.
pub fn construct_quote_response(quote: &PriceQuote, side: Side) -> QuotingResult<IndicativeRate> {
    let rate = quote
        .usable_price()
        .and_then(|price| Rate::for_side(price, side))
        .ok_or_else(|| QuotingError::Rejected(rejection_message(quote)))?;

    Ok(IndicativeRate {
        min_amount: quote.min_amount,
        max_amount: quote.max_amount,
        rate,
        maker_address: quote.maker_address.clone(),
    })
}
