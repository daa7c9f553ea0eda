//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bridge_requests_total` (counter): bridge calls by outcome
//! - `bridge_request_duration_seconds` (histogram): bridge call latency by outcome
//! - `bridge_health_checks_total` (counter): health probes by result
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_bridge_outcome(outcome: &'static str, start: Instant) {
    metrics::counter!("bridge_requests_total", "outcome" => outcome).increment(1);
    metrics::histogram!("bridge_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_health_check(healthy: bool) {
    let result = if healthy { "healthy" } else { "unhealthy" };
    metrics::counter!("bridge_health_checks_total", "result" => result).increment(1);
}
