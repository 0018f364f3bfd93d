//! Metrics collection and exposition.
//!
//! # Metrics
//! - `injector_decisions_total` (counter): engine decisions by outcome
//! - `injector_http_requests_total` (counter): API requests by route, status
//! - `injector_config_reloads_total` (counter): applied config reloads
//!
//! Without an installed recorder every call is a no-op, so the engine can
//! record unconditionally.

use std::net::SocketAddr;

use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must run inside a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_counter!("injector_decisions_total", "Injection decisions by outcome");
            describe_counter!("injector_http_requests_total", "API requests by route and status");
            describe_counter!("injector_config_reloads_total", "Configuration reloads applied");
            tracing::info!(address = %addr, "Metrics endpoint listening");
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter");
        }
    }
}

/// Count one engine decision.
pub fn record_decision(outcome: &'static str) {
    counter!("injector_decisions_total", "outcome" => outcome).increment(1);
}

/// Count one API request.
pub fn record_request(route: String, status: u16) {
    counter!(
        "injector_http_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
}

/// Count one applied config reload.
pub fn record_reload() {
    counter!("injector_config_reloads_total").increment(1);
}
