//! Error types for the proxy
//!
//! Every failure that happens before the first response byte is rendered as a
//! `{"error": "<message>"}` envelope. Failures after a stream has started are
//! `RelayError`s and only ever terminate the body.

use std::time::Duration;

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized request")]
    Unauthorized,

    #[error("{0}")]
    ConfigMissing(String),

    #[error("{0}")]
    BadInput(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    TokenFailure(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Http(#[from] reqwest::Error),
}

impl AppError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadInput(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::ConfigMissing(_)
            | AppError::TokenFailure(_)
            | AppError::Upstream(_)
            | AppError::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "unauthorized",
            AppError::ConfigMissing(_) => "config_missing",
            AppError::BadInput(_) => "bad_input",
            AppError::PayloadTooLarge(_) => "payload_too_large",
            AppError::TokenFailure(_) => "token_failure",
            AppError::Upstream(_) | AppError::Http(_) => "upstream_failure",
        }
    }
}

/// Body extraction failures (size limit, aborted upload) keep the JSON envelope
impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge("Request body too large".to_string())
        } else {
            AppError::BadInput(rejection.body_text())
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Failure after a streaming response has been committed
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("upstream stream failed: {0}")]
    Upstream(String),

    #[error("no upstream chunk within {0:?}")]
    IdleTimeout(Duration),
}

impl RelayError {
    pub fn reason(&self) -> &'static str {
        match self {
            RelayError::Upstream(_) => "upstream_error",
            RelayError::IdleTimeout(_) => "idle_timeout",
        }
    }
}
