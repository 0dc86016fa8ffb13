//! Market-maker signing gateway.
//!
//! Wires the configuration caches, the quoting provider and the signing key
//! together:
//! - Background refresh of market-maker config, pairs, tokens and fee overrides
//! - Indicative rates and firm signed orders for takers
//! - Deal and exception notifications forwarded to the provider

pub mod app;
pub mod config;
pub mod error;

pub use app::{Gateway, NewOrderReply, RateReply};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
