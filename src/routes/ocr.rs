//! OCR proxy endpoint
//!
//! Always atomic: token call, then recognition, then the provider's JSON
//! result is passed back unchanged.

use std::sync::Arc;

use axum::{
    extract::{rejection::BytesRejection, State},
    response::Response,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    error::{AppError, AppResult},
    framing,
    proxy::{OcrEndpoint, RequestContext},
    routes::metrics::record_request,
    AppState,
};

fn default_target_language() -> String {
    "ENG".to_string()
}

/// OCR submission from the app
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrRequest {
    #[serde(default)]
    pub image_data: Option<String>,
    #[serde(default)]
    pub use_accurate: bool,
    /// Accepted for compatibility; translation happens on the client
    #[serde(default)]
    pub need_translation: bool,
    #[serde(default = "default_target_language")]
    pub target_language: String,
}

impl OcrRequest {
    pub fn parse(body: &[u8]) -> AppResult<Self> {
        serde_json::from_slice(body)
            .map_err(|e| AppError::BadInput(format!("Invalid OCR request: {}", e)))
    }

    /// Base64 image payload; absent or blank is rejected before any network call
    pub fn image(&self) -> AppResult<&str> {
        self.image_data
            .as_deref()
            .filter(|data| !data.trim().is_empty())
            .ok_or_else(|| AppError::BadInput("Missing image data".to_string()))
    }

    pub fn endpoint(&self) -> OcrEndpoint {
        OcrEndpoint::from_accurate_flag(self.use_accurate)
    }
}

/// Handle an OCR proxy call
pub async fn ocr_proxy(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    let ctx = RequestContext::new("ocr");

    match proxy_ocr(&state, &ctx, body).await {
        Ok(response) => {
            let outcome = if response.status().is_success() { "success" } else { "upstream_status" };
            record_request(ctx.route, outcome, ctx.elapsed_secs());
            Ok(response)
        }
        Err(e) => {
            ctx.log_error(&e.to_string());
            record_request(ctx.route, e.kind(), ctx.elapsed_secs());
            Err(e)
        }
    }
}

async fn proxy_ocr(
    state: &AppState,
    ctx: &RequestContext,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Response> {
    let credential = state.config.require_ocr_credential()?;
    let body = body?;

    let request = OcrRequest::parse(&body)?;
    let image = request.image()?;
    let endpoint = request.endpoint();

    ctx.log_request_start(body.len());
    info!(
        trace_id = %ctx.trace_id,
        endpoint = %endpoint.path(),
        image_len = image.len(),
        "Processing OCR request"
    );
    if request.need_translation {
        debug!(
            trace_id = %ctx.trace_id,
            target_language = %request.target_language,
            "Translation requested; left to the client"
        );
    }

    let access_token = state.ocr.fetch_access_token(credential).await?;

    ctx.log_upstream_request(&state.ocr.recognition_url(endpoint));
    let upstream = state.ocr.recognize(&access_token, endpoint, image).await?;
    ctx.log_upstream_response(upstream.status.as_u16());

    let status = upstream.status;
    let bytes = upstream.into_json_bytes().await?;
    ctx.log_request_complete(status.as_u16(), bytes.len());

    Ok(framing::atomic_json(status, bytes))
}
