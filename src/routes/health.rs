//! Health check endpoint
//!
//! `/health` reports liveness plus which proxy routes have credentials.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

/// Credential state of a proxy route
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum RouteStatus {
    Configured,
    Unconfigured,
}

impl RouteStatus {
    fn from_present(present: bool) -> Self {
        if present {
            RouteStatus::Configured
        } else {
            RouteStatus::Unconfigured
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RouteChecks {
    pub chat: RouteStatus,
    pub ocr: RouteStatus,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: String,
    pub routes: RouteChecks,
}

/// Liveness endpoint. Always 200 while the process is serving.
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let response = HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        routes: RouteChecks {
            chat: RouteStatus::from_present(state.config.chat_credential.is_some()),
            ocr: RouteStatus::from_present(state.config.ocr_credential.is_some()),
        },
    };

    (StatusCode::OK, Json(response))
}
