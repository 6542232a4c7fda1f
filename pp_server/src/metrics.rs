//! Prometheus metrics for the planning poker server.
//!
//! Metrics are recorded through the `metrics` facade and only exported when
//! [`init_metrics`] installed the Prometheus exporter; otherwise every call is
//! a no-op.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use pp_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::rooms_created_total();
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
///
/// # Arguments
///
/// - `addr`: Address to bind the metrics server to (e.g., `0.0.0.0:9090`)
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
///
/// `route` should be the matched route template, not the raw path, to keep
/// label cardinality bounded.
pub fn http_requests_total(method: &str, route: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, route: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// WebSocket Metrics
// ============================================================================

/// Track a newly opened room watch.
pub fn websocket_connected() {
    metrics::counter!("websocket_connections_total").increment(1);
    metrics::gauge!("websocket_connections_active").increment(1.0);
}

/// Track a closed room watch.
pub fn websocket_disconnected() {
    metrics::gauge!("websocket_connections_active").decrement(1.0);
}

/// Increment WebSocket messages sent counter.
pub fn websocket_messages_sent() {
    metrics::counter!("websocket_messages_sent").increment(1);
}

// ============================================================================
// Room Metrics
// ============================================================================

pub fn rooms_created_total() {
    metrics::counter!("rooms_created_total").increment(1);
}

pub fn room_joins_total() {
    metrics::counter!("room_joins_total").increment(1);
}

/// Increment votes counter; withdrawn votes are labelled separately.
pub fn votes_total(withdrawn: bool) {
    metrics::counter!("votes_total",
        "withdrawn" => withdrawn.to_string()
    )
    .increment(1);
}

pub fn reveals_total(reveal: bool) {
    metrics::counter!("reveals_total",
        "reveal" => reveal.to_string()
    )
    .increment(1);
}

pub fn resets_total() {
    metrics::counter!("resets_total").increment(1);
}
