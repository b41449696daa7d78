//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rewrite_dispatch_total` (counter): dispatch decisions by outcome
//! - `rewrite_requests_total` (counter): served requests by status and matched rule
//! - `rewrite_request_duration_seconds` (histogram): end-to-end latency
//! - `rewrite_rules_compiled` (gauge): rules in the active rewrite table
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels stay low-cardinality: pattern strings, never raw paths

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_dispatch(outcome: &'static str) {
    ::metrics::counter!("rewrite_dispatch_total", "outcome" => outcome).increment(1);
}

pub fn record_request(status: u16, rule: &str, start: Instant) {
    ::metrics::counter!(
        "rewrite_requests_total",
        "status" => status.to_string(),
        "rule" => rule.to_string()
    )
    .increment(1);
    ::metrics::histogram!("rewrite_request_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rules_compiled(count: usize) {
    ::metrics::gauge!("rewrite_rules_compiled").set(count as f64);
}
