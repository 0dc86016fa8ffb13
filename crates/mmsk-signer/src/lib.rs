//! Order construction and signing for the market-maker gateway.
//!
//! Given a normalized query and an accepted price, builds the
//! protocol-specific order, computes its EIP-712 digest and signs it:
//!
//! 1. PMMV5: 0x v2 order settled through the PMM proxy
//! 2. RFQV1: Tokenlon RFQ order
//!
//! The trailing byte of every signature marks the scheme used (plain EOA or
//! market-maker proxy wallet).

pub mod digest;
pub mod dispatcher;
pub mod error;
pub mod keys;
pub mod order;
pub mod signature;

pub use dispatcher::{build_signed_order, ProtocolContext};
pub use error::{OrderError, OrderResult};
pub use keys::{KeyError, KeyManager, KeySource};
pub use order::{PmmV5Order, RfqV1Order, SignedOrder};
pub use signature::{PmmSignatureType, RfqSignatureType, SignatureScheme};
