//! Prometheus metrics and structured logging for the signing gateway.
//!
//! - Prometheus counters for cache refreshes and signed orders
//! - Structured JSON logging with tracing

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging_with_default;
pub use metrics::Metrics;
