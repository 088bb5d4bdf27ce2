//! Request logging utilities
//!
//! Structured logging with short correlation IDs so a single proxied call can
//! be followed from the gate to the last relayed chunk.

use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Context for tracking a request through the proxy
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request (for log correlation)
    pub trace_id: String,
    /// When the request started
    pub start_time: Instant,
    /// Route label, `chat` or `ocr`
    pub route: &'static str,
    /// Whether the response is relayed as a stream
    pub streaming: bool,
}

impl RequestContext {
    pub fn new(route: &'static str) -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string()[..8].to_string(),
            start_time: Instant::now(),
            route,
            streaming: false,
        }
    }

    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    pub fn log_request_start(&self, body_size: usize) {
        info!(
            trace_id = %self.trace_id,
            route = %self.route,
            streaming = %self.streaming,
            body_size = %body_size,
            "Request started"
        );
    }

    /// Log request being sent to upstream. `url` must not carry credentials.
    pub fn log_upstream_request(&self, url: &str) {
        debug!(
            trace_id = %self.trace_id,
            route = %self.route,
            url = %url,
            elapsed_ms = %self.elapsed_ms(),
            "Sending request to upstream"
        );
    }

    pub fn log_upstream_response(&self, status: u16) {
        info!(
            trace_id = %self.trace_id,
            route = %self.route,
            status = %status,
            elapsed_ms = %self.elapsed_ms(),
            "Response received from upstream"
        );
    }

    pub fn log_request_complete(&self, status: u16, body_size: usize) {
        info!(
            trace_id = %self.trace_id,
            route = %self.route,
            status = %status,
            body_size = %body_size,
            elapsed_ms = %self.elapsed_ms(),
            "Request completed"
        );
    }

    pub fn log_stream_started(&self) {
        info!(
            trace_id = %self.trace_id,
            route = %self.route,
            elapsed_ms = %self.elapsed_ms(),
            "Streaming response started"
        );
    }

    pub fn log_stream_ended(&self, chunks: u64, bytes: u64) {
        info!(
            trace_id = %self.trace_id,
            route = %self.route,
            chunks = %chunks,
            bytes = %bytes,
            elapsed_ms = %self.elapsed_ms(),
            "Streaming response ended"
        );
    }

    pub fn log_stream_aborted(&self, chunks: u64, error: &str) {
        warn!(
            trace_id = %self.trace_id,
            route = %self.route,
            chunks = %chunks,
            error = %error,
            elapsed_ms = %self.elapsed_ms(),
            "Streaming response aborted"
        );
    }

    pub fn log_client_disconnected(&self, chunks: u64) {
        info!(
            trace_id = %self.trace_id,
            route = %self.route,
            chunks = %chunks,
            elapsed_ms = %self.elapsed_ms(),
            "Client went away, upstream read abandoned"
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            trace_id = %self.trace_id,
            route = %self.route,
            elapsed_ms = %self.elapsed_ms(),
            message = %message,
            "Warning during request"
        );
    }

    pub fn log_error(&self, error: &str) {
        error!(
            trace_id = %self.trace_id,
            route = %self.route,
            streaming = %self.streaming,
            elapsed_ms = %self.elapsed_ms(),
            error = %error,
            "Request failed"
        );
    }
}
