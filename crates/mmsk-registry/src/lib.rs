//! Configuration caches for the signing gateway.
//!
//! Keeps market-maker config, tradable pairs, the token list and per-token
//! fee overrides fresh in the background, and derives the supported-token
//! matrix from them. Request handlers only ever read point-in-time
//! snapshots.

pub mod client;
pub mod error;
pub mod registry;
pub mod tokens;
pub mod updater;

pub use client::ConfigClient;
pub use error::{RegistryError, RegistryResult, Unavailable};
pub use registry::{ConfigRegistry, RegistrySnapshot, SourceName};
pub use tokens::{
    find_by_address, find_by_symbol, is_supported_pair, pair_adjacency, supported_tokens,
};
pub use updater::{
    BoxFuture, RefreshOutcome, UpdateFailure, Updater, UpdaterStatus, MIN_REFRESH_INTERVAL,
};
