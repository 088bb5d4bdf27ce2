//! HTTP routes for the proxy
//!
//! This module defines all HTTP endpoints exposed by the service.

pub mod chat;
pub mod health;
pub mod metrics;
pub mod ocr;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    middleware::{
        cors::with_cors_headers,
        gate::{identity_gate, preflight},
    },
    AppState,
};

/// Chat-completion proxy path
pub const CHAT_ROUTE: &str = "/functions/v1/deepseek-proxy";
/// OCR proxy path
pub const OCR_ROUTE: &str = "/functions/v1/baidu-ocr-proxy";

/// Metric label for a request path, shared by handlers and the gate
pub fn route_label(path: &str) -> &'static str {
    match path {
        CHAT_ROUTE => "chat",
        OCR_ROUTE => "ocr",
        _ => "other",
    }
}

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    // The gate runs before either handler reads the body
    let proxy_routes = Router::new()
        .route(CHAT_ROUTE, post(chat::chat_proxy).options(preflight))
        .route(OCR_ROUTE, post(ocr::ocr_proxy).options(preflight))
        .route_layer(middleware::from_fn_with_state(state.clone(), identity_gate))
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes));

    // Public routes - no identity required
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::prometheus_metrics));

    let router = Router::new()
        .merge(public_routes)
        .merge(proxy_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    with_cors_headers(router)
}
