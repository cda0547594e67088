//! Metrics collection and exposition.
//!
//! # Metrics
//! - `variant_requests_total` (counter): requests by status
//! - `variant_request_duration_seconds` (histogram): time to response headers
//! - `variant_assignments_total` (counter): assignments by variant and stickiness

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::experiment::Assignment;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(status: u16, start: Instant) {
    ::metrics::counter!("variant_requests_total", "status" => status.to_string()).increment(1);
    ::metrics::histogram!("variant_request_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

pub fn record_assignment(assignment: &Assignment) {
    let sticky = if assignment.context.was_returning_visitor {
        "true"
    } else {
        "false"
    };
    ::metrics::counter!(
        "variant_assignments_total",
        "variant" => assignment.index.number().to_string(),
        "sticky" => sticky
    )
    .increment(1);
}
