//! Response framing
//!
//! Builds the downstream response for the two proxy modes. The cross-origin
//! header set is added to every response by the router layer in
//! `middleware::cors`, so nothing here repeats it.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use crate::streaming::RelayStream;

/// Content type for relayed streams. The bytes are the provider's own event
/// protocol, passed through untouched.
pub const STREAM_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// How the response body is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyMode {
    /// Body assembled before the first byte is sent
    Atomic,
    /// Body relayed chunk by chunk while upstream is still open
    Streaming,
}

impl ProxyMode {
    /// Only a literal boolean `true` selects streaming
    pub fn from_stream_flag(stream: Option<bool>) -> Self {
        if stream == Some(true) {
            ProxyMode::Streaming
        } else {
            ProxyMode::Atomic
        }
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self, ProxyMode::Streaming)
    }
}

/// Atomic response: upstream status mirrored, JSON body passed through byte-for-byte
pub fn atomic_json(status: StatusCode, body: Bytes) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        body,
    )
        .into_response()
}

/// Streaming response: status is fixed at 200 because headers leave before the body outcome is known
pub fn streaming(body: RelayStream) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(STREAM_CONTENT_TYPE)),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
            (header::CONNECTION, HeaderValue::from_static("keep-alive")),
        ],
        [("x-accel-buffering", "no")],
        Body::from_stream(body),
    )
        .into_response()
}
