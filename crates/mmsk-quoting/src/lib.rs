//! Quoting-provider integration and quote preprocessing.
//!
//! - `Quoter`: the external price provider, over HTTP or mocked
//! - `normalize`: symbol resolution and buy-side fee inflation
//! - `check_params`: pair, amount and user checks before quoting
//! - `construct_quote_response`: indicative rates for callers
//! - quote-id prefixing and the pairs preflight check

pub mod check;
pub mod error;
pub mod http;
pub mod params;
pub mod preprocess;
pub mod quote_id;
pub mod quoter;
pub mod rate;

pub use check::{check_pairs, PairsCheckIssue};
pub use error::{QuotingError, QuotingResult};
pub use http::HttpQuoter;
pub use params::{check_params, ParamsIssue};
pub use preprocess::{
    apply_fee_to_amount, effective_fee_factor, ensure_correct_symbol_case, normalize,
};
pub use quote_id::{add_quote_id_prefix, remove_quote_id_prefix, QUOTE_ID_SEPARATOR};
pub use quoter::{DealOrder, DynQuoter, ExceptionOrder, MockQuoter, NotifyAck, Quoter};
pub use rate::{construct_quote_response, rejection_message, IndicativeRate};
