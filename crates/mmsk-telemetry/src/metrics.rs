//! Prometheus metrics for the signing gateway.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A registration failure means a
//! duplicate metric name, which must crash at startup. These panics only occur
//! during static initialization, never at runtime.

use crate::error::{TelemetryError, TelemetryResult};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge_vec, register_histogram_vec, register_int_gauge,
    CounterVec, Encoder, GaugeVec, HistogramVec, IntGauge, TextEncoder,
};

/// Cache refresh attempts.
/// Labels: updater, outcome (updated/overlapped/failed)
pub static UPDATER_REFRESH_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "mmsk_updater_refresh_total",
        "Cache refresh attempts by outcome",
        &["updater", "outcome"]
    )
    .unwrap()
});

/// Unix time of the last successful refresh per updater.
pub static UPDATER_LAST_SUCCESS_SECONDS: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "mmsk_updater_last_success_seconds",
        "Unix time of the last successful cache refresh",
        &["updater"]
    )
    .unwrap()
});

/// Signed orders.
/// Labels: protocol (PMMV5/RFQV1), scheme (eoa/wallet)
pub static ORDERS_SIGNED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "mmsk_orders_signed_total",
        "Orders signed by protocol and signature scheme",
        &["protocol", "scheme"]
    )
    .unwrap()
});

/// Orders that were not signed.
/// Labels: protocol, kind (validation/rejected/config/quoting/signing/timeout)
pub static ORDER_FAILURES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "mmsk_order_failures_total",
        "Order requests that did not produce a signed order",
        &["protocol", "kind"]
    )
    .unwrap()
});

/// Quoting provider call latency.
pub static QUOTER_LATENCY_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "mmsk_quoter_latency_ms",
        "Quoting provider call latency in milliseconds",
        &["method"],
        vec![5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0]
    )
    .unwrap()
});

/// Number of tokens with at least one tradable opposite.
pub static SUPPORTED_TOKENS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "mmsk_supported_tokens",
        "Tokens with at least one tradable opposite"
    )
    .unwrap()
});

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    /// Record a cache refresh outcome.
    pub fn updater_refresh(updater: &str, outcome: &str) {
        UPDATER_REFRESH_TOTAL
            .with_label_values(&[updater, outcome])
            .inc();
    }

    /// Record the time of a successful refresh.
    pub fn updater_success(updater: &str, unix_secs: f64) {
        UPDATER_LAST_SUCCESS_SECONDS
            .with_label_values(&[updater])
            .set(unix_secs);
    }

    /// Record a signed order.
    pub fn order_signed(protocol: &str, scheme: &str) {
        ORDERS_SIGNED_TOTAL
            .with_label_values(&[protocol, scheme])
            .inc();
    }

    /// Record an order request that failed.
    pub fn order_failed(protocol: &str, kind: &str) {
        ORDER_FAILURES_TOTAL
            .with_label_values(&[protocol, kind])
            .inc();
    }

    /// Record quoting provider latency.
    pub fn quoter_latency(method: &str, latency_ms: f64) {
        QUOTER_LATENCY_MS
            .with_label_values(&[method])
            .observe(latency_ms);
    }

    /// Update the supported-token gauge.
    pub fn supported_tokens(count: usize) {
        SUPPORTED_TOKENS.set(count as i64);
    }

    /// Render the default registry in the Prometheus text format.
    pub fn render() -> TelemetryResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buffer)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
