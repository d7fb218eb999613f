//! Metrics collection and exposition.
//!
//! # Metrics
//! - `harness_probes_total` (counter): completed probes by target, state
//! - `harness_backend_health` (gauge): 1=online, 0=offline
//! - `harness_operations_total` (counter): operations by target, operation, outcome
//! - `harness_operation_duration_seconds` (histogram): operation latency

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::health::HealthState;
use crate::operations::Operation;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_probe(target: &str, state: HealthState) {
    counter!(
        "harness_probes_total",
        "target" => target.to_string(),
        "state" => state.to_string()
    )
    .increment(1);
    gauge!("harness_backend_health", "target" => target.to_string())
        .set(if state == HealthState::Online { 1.0 } else { 0.0 });
}

pub fn record_operation(target: &str, operation: Operation, success: bool, start: Instant) {
    let outcome = if success { "success" } else { "failure" };
    counter!(
        "harness_operations_total",
        "target" => target.to_string(),
        "operation" => operation.as_str(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!(
        "harness_operation_duration_seconds",
        "target" => target.to_string(),
        "operation" => operation.as_str()
    )
    .record(start.elapsed().as_secs_f64());
}
