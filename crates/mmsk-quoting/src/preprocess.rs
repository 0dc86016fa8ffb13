//! Query normalization and buy-side fee inflation.
//!
//! On a BUY the fee is taken from the base token the market maker delivers,
//! so the requested amount is grossed up until the taker receives what they
//! asked for after fees. The division happens before truncation, and the
//! truncation uses the token's display precision, not its on-chain decimals.

use mmsk_core::{Amount, FeeFactor, Query, Side, SupportedToken};
use mmsk_registry::RegistrySnapshot;
use tracing::{debug, warn};

/// Gross up `amount` so that `amount * (1 - fee)` is what the taker keeps.
///
/// `None` only if the division overflows.
pub fn apply_fee_to_amount(amount: Amount, fee: FeeFactor, precision: u32) -> Option<Amount> {
    amount
        .inner()
        .checked_div(fee.net_ratio())
        .map(|gross| Amount::new(gross).truncate(precision))
}

/// Fee factor for `symbol`: query override, then the token's config, then the
/// market maker's default, then the fixed fallback.
pub fn effective_fee_factor(
    query_override: Option<i64>,
    snapshot: &RegistrySnapshot,
    symbol: &str,
) -> FeeFactor {
    let mm_default = snapshot.market_maker().ok().and_then(|c| c.fee_factor);
    FeeFactor::resolve([query_override, snapshot.token_fee_factor(symbol), mm_default])
}

/// Resolve base and quote to their canonical symbols and lower-case addresses.
///
/// When both addresses are given they take precedence over symbols.
/// Anything that cannot be resolved is left as the caller sent it.
pub fn ensure_correct_symbol_case(query: &Query, tokens: &[SupportedToken]) -> Query {
    let mut result = query.clone();

    let apply = |token: Option<&SupportedToken>,
                 symbol: &mut Option<String>,
                 address: &mut Option<String>| {
        if let Some(token) = token {
            *symbol = Some(token.symbol().to_string());
            *address = Some(token.contract_address().to_ascii_lowercase());
        }
    };

    match (query.base_address.as_deref(), query.quote_address.as_deref()) {
        (Some(base_address), Some(quote_address)) => {
            apply(
                mmsk_registry::find_by_address(tokens, base_address),
                &mut result.base,
                &mut result.base_address,
            );
            apply(
                mmsk_registry::find_by_address(tokens, quote_address),
                &mut result.quote,
                &mut result.quote_address,
            );
        }
        _ => {
            apply(
                query
                    .base
                    .as_deref()
                    .and_then(|s| mmsk_registry::find_by_symbol(tokens, s)),
                &mut result.base,
                &mut result.base_address,
            );
            apply(
                query
                    .quote
                    .as_deref()
                    .and_then(|s| mmsk_registry::find_by_symbol(tokens, s)),
                &mut result.quote,
                &mut result.quote_address,
            );
        }
    }

    result
}

/// Normalize a caller query against the snapshot.
///
/// Never mutates `query`. SELL queries and BUY queries whose base is unknown
/// keep their amount; BUY queries on a known base get the fee-inflated
/// amount and the applied fee factor.
pub fn normalize(query: &Query, snapshot: &RegistrySnapshot) -> Query {
    let mut result = ensure_correct_symbol_case(query, snapshot.supported_tokens());

    if query.side != Side::Buy {
        return result;
    }

    let Some(base) = result.base.as_deref().and_then(|b| snapshot.find_token(b)) else {
        return result;
    };

    let fee = effective_fee_factor(query.fee_factor, snapshot, base.symbol());
    let precision = base.meta.precision;

    if let Some(amount) = query.amount {
        match apply_fee_to_amount(Amount::new(amount), fee, precision) {
            Some(converted) => {
                debug!(
                    amount = %amount,
                    converted = %converted,
                    fee_factor = fee.bps(),
                    "Converted buy-side amount"
                );
                result.amount = Some(converted.inner());
            }
            None => warn!(amount = %amount, fee_factor = fee.bps(), "Fee inflation overflowed"),
        }
    }
    result.fee_factor = Some(i64::from(fee.bps()));

    result
}
