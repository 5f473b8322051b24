//! Metrics collection and exposition.
//!
//! # Metrics
//! - `todo_guard_circuit_state` (gauge): 0=closed, 1=open, 2=half-open
//! - `todo_guard_circuit_transitions_total` (counter): by component, target state
//! - `todo_guard_circuit_rejections_total` (counter): fast-failed calls
//! - `todo_guard_circuit_calls_total` (counter): by component, outcome
//! - `todo_guard_cache_requests_total` (counter): hit / miss / error
//! - `todo_guard_cache_errors_total` (counter): swallowed backend errors by op
//! - `todo_guard_todo_operations_total` (counter): list / create / delete
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, which keeps tests exporter-free
//! - Prometheus exporter is installed only by the binary

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::resilience::CircuitState;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn record_circuit_state(component: &str, state: CircuitState) {
    gauge!("todo_guard_circuit_state", "component" => component.to_string()).set(state.as_gauge());
}

pub fn record_circuit_transition(component: &str, to: CircuitState) {
    counter!(
        "todo_guard_circuit_transitions_total",
        "component" => component.to_string(),
        "to" => to.as_str()
    )
    .increment(1);
    record_circuit_state(component, to);
}

pub fn record_circuit_rejection(component: &str) {
    counter!("todo_guard_circuit_rejections_total", "component" => component.to_string())
        .increment(1);
}

pub fn record_circuit_call(component: &str, outcome: &'static str) {
    counter!(
        "todo_guard_circuit_calls_total",
        "component" => component.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_cache_request(result: &'static str) {
    counter!("todo_guard_cache_requests_total", "result" => result).increment(1);
}

pub fn record_cache_error(op: &'static str) {
    counter!("todo_guard_cache_errors_total", "op" => op).increment(1);
}

pub fn record_todo_operation(op: &'static str) {
    counter!("todo_guard_todo_operations_total", "op" => op).increment(1);
}
