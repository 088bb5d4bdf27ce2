//! Prometheus metrics endpoint
//!
//! Exposes proxy metrics in Prometheus format for monitoring.

use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// Global Prometheus handle for metrics export
static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize metrics (call once at startup)
pub fn init_metrics() -> anyhow::Result<()> {
    PROMETHEUS_HANDLE.get_or_try_init(|| PrometheusBuilder::new().install_recorder())?;
    register_metrics();
    Ok(())
}

/// Register all custom metrics
fn register_metrics() {
    metrics::describe_counter!(
        "proxy_requests_total",
        "Total number of proxied requests by route and outcome"
    );
    metrics::describe_histogram!(
        "proxy_request_duration_seconds",
        "Time until the response head was ready, in seconds"
    );
    metrics::describe_counter!(
        "proxy_relay_chunks_total",
        "Chunks relayed from upstream streams"
    );
    metrics::describe_counter!(
        "proxy_relay_bytes_total",
        "Bytes relayed from upstream streams"
    );
    metrics::describe_counter!(
        "proxy_relay_aborts_total",
        "Relays that ended without a clean upstream end-of-stream"
    );
}

/// Prometheus metrics endpoint handler
pub async fn prometheus_metrics() -> impl IntoResponse {
    PROMETHEUS_HANDLE
        .get()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

/// Record a finished request head
pub fn record_request(route: &str, outcome: &str, duration_secs: f64) {
    metrics::counter!("proxy_requests_total", "route" => route.to_string(), "outcome" => outcome.to_string())
        .increment(1);
    metrics::histogram!("proxy_request_duration_seconds", "route" => route.to_string())
        .record(duration_secs);
}

/// Record a request turned away at the gate
pub fn record_rejection(route: &str) {
    metrics::counter!("proxy_requests_total", "route" => route.to_string(), "outcome" => "unauthorized")
        .increment(1);
}

/// Record one relayed chunk
pub fn record_relay_chunk(len: usize) {
    metrics::counter!("proxy_relay_chunks_total").increment(1);
    metrics::counter!("proxy_relay_bytes_total").increment(len as u64);
}

/// Record a relay that did not end cleanly
pub fn record_relay_abort(reason: &str) {
    metrics::counter!("proxy_relay_aborts_total", "reason" => reason.to_string()).increment(1);
}
