//! Request gate
//!
//! Runs before any proxy handler. Pre-flight requests are acknowledged
//! without an identity check; everything else must present the expected
//! application identity or is rejected before any upstream call is made.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{instrument, warn};

use crate::{
    config::BUNDLE_ID_HEADER,
    error::AppError,
    routes::{metrics::record_rejection, route_label},
    AppState,
};

/// Whether the presented identity header matches exactly
pub fn is_expected_identity(presented: Option<&str>, expected: &str) -> bool {
    presented == Some(expected)
}

/// Pre-flight acknowledgement. The cross-origin set is added by the router layer.
pub async fn preflight() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Identity gate middleware
///
/// 1. Lets `OPTIONS` through to the pre-flight handler
/// 2. Compares `x-bundle-id` against the configured identity
/// 3. Rejects with 401 on absence or mismatch
#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn identity_gate(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let presented = request
        .headers()
        .get(BUNDLE_ID_HEADER)
        .and_then(|h| h.to_str().ok());

    if !is_expected_identity(presented, &state.config.bundle_id) {
        warn!(
            present = presented.is_some(),
            "Rejected request with missing or unexpected application identity"
        );
        record_rejection(route_label(request.uri().path()));
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
