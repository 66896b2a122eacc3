//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): relay requests by outcome, status
//! - `relay_request_duration_seconds` (histogram): time to response head
//! - `media_streams_total` (counter): finished body streams by role, outcome
//! - `media_stream_bytes_total` (counter): body bytes delivered by role
//!
//! # Design Decisions
//! - Facade calls are cheap no-ops until a recorder is installed
//! - Prometheus exporter is opt-in

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a relay request once its response head is decided.
pub fn record_request(outcome: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "relay_requests_total",
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("relay_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record the end of a body stream.
pub fn record_stream_end(role: &'static str, outcome: &'static str, bytes: u64) {
    metrics::counter!("media_streams_total", "role" => role, "outcome" => outcome).increment(1);
    metrics::counter!("media_stream_bytes_total", "role" => role).increment(bytes);
}
