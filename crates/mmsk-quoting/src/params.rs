//! Request parameter checks run before the provider is asked for a price.

use mmsk_core::Query;
use mmsk_registry::RegistrySnapshot;
use rust_decimal::Decimal;
use thiserror::Error;

/// First problem found in a normalized query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsIssue {
    #[error("base and quote are required")]
    MissingPair,

    #[error("Unsupported pair {base}/{quote}")]
    UnsupportedPair { base: String, quote: String },

    #[error("amount must be a positive number")]
    InvalidAmount,

    #[error("userAddr is required")]
    MissingUser,
}

/// Check a normalized query against the snapshot.
///
/// Indicative requests (`firm == false`) may omit the amount and the user;
/// firm requests need both.
pub fn check_params(
    query: &Query,
    snapshot: &RegistrySnapshot,
    firm: bool,
) -> Result<(), ParamsIssue> {
    let (Some(base), Some(quote)) = (query.base.as_deref(), query.quote.as_deref()) else {
        return Err(ParamsIssue::MissingPair);
    };

    if !snapshot.is_supported_pair(base, quote) {
        return Err(ParamsIssue::UnsupportedPair {
            base: base.to_string(),
            quote: quote.to_string(),
        });
    }

    match query.amount {
        Some(amount) if amount <= Decimal::ZERO => return Err(ParamsIssue::InvalidAmount),
        None if firm => return Err(ParamsIssue::InvalidAmount),
        _ => {}
    }

    if firm && query.user_addr.as_deref().map_or(true, str::is_empty) {
        return Err(ParamsIssue::MissingUser);
    }

    Ok(())
}
