//! Core domain types for the market-maker signing gateway.
//!
//! This crate provides the vocabulary shared by every other crate:
//! - `Amount`, `Rate`: exact decimal arithmetic for order amounts
//! - `FeeFactor`: basis-point fee factor and its precedence rule
//! - `MarketMakerConfig`, `TokenMeta`, `SupportedToken`: configuration data
//! - `Query`, `PriceQuote`: request-scoped values
//! - `Clock`: time source for expirations

pub mod clock;
pub mod decimal;
pub mod error;
pub mod fee;
pub mod query;
pub mod quote;
pub mod serde_util;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use decimal::{Amount, Rate, RATE_DECIMALS};
pub use error::{CoreError, Result};
pub use fee::{FeeFactor, BPS_DENOMINATOR};
pub use query::{Query, DEFAULT_PROTOCOL};
pub use quote::PriceQuote;
pub use types::{
    AddressBook, MarketMakerConfig, Protocol, Side, SupportedToken, TokenFeeConfig, TokenMeta,
    NATIVE_TOKEN_SYMBOL, ZERO_ADDRESS,
};
