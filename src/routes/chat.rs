//! Chat-completion proxy endpoint
//!
//! The body is decoded once into `ChatCompletionRequest` to validate it and
//! read `stream`, but the original bytes are what gets forwarded.

use std::sync::Arc;

use axum::{
    extract::{rejection::BytesRejection, State},
    response::Response,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    framing::{self, ProxyMode},
    proxy::{RequestContext, UpstreamResponse},
    routes::metrics::record_request,
    streaming::relay,
    AppState,
};

/// Chat message. The role is left open so newer provider roles pass through.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<serde_json::Value>,
}

/// Chat completion request, as far as the proxy needs to understand it
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub stream: Option<bool>,
}

impl ChatCompletionRequest {
    /// Decode and validate the inbound body
    pub fn parse(body: &[u8]) -> AppResult<Self> {
        serde_json::from_slice(body)
            .map_err(|e| AppError::BadInput(format!("Invalid chat completion request: {}", e)))
    }

    pub fn mode(&self) -> ProxyMode {
        ProxyMode::from_stream_flag(self.stream)
    }
}

/// Handle a chat-completion proxy call
pub async fn chat_proxy(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    let ctx = RequestContext::new("chat");

    match proxy_chat(&state, &ctx, body).await {
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

async fn proxy_chat(
    state: &AppState,
    ctx: &RequestContext,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Response> {
    let credential = state.config.require_chat_credential()?;
    let body = body?;

    let request = ChatCompletionRequest::parse(&body)?;
    let mode = request.mode();
    let ctx = ctx.clone().with_streaming(mode.is_streaming());

    ctx.log_request_start(body.len());
    info!(
        trace_id = %ctx.trace_id,
        model = %request.model,
        messages = request.messages.len(),
        temperature = ?request.temperature,
        max_tokens = ?request.max_tokens,
        stream = mode.is_streaming(),
        "Processing chat completion request"
    );

    ctx.log_upstream_request(state.chat.url());
    let upstream = state.chat.forward(credential, body).await?;
    ctx.log_upstream_response(upstream.status.as_u16());

    match mode {
        ProxyMode::Atomic => frame_atomic(&ctx, upstream).await,
        ProxyMode::Streaming if !upstream.status.is_success() => {
            // Nothing has been sent yet, so the failure can still be reported whole
            ctx.log_warning("Upstream rejected streaming request before the stream opened");
            frame_atomic(&ctx, upstream).await
        }
        ProxyMode::Streaming => Ok(framing::streaming(relay(
            upstream.body,
            state.config.stream_idle_timeout,
            ctx,
        ))),
    }
}

async fn frame_atomic(ctx: &RequestContext, upstream: UpstreamResponse) -> AppResult<Response> {
    let status = upstream.status;
    let bytes = upstream.into_json_bytes().await?;
    ctx.log_request_complete(status.as_u16(), bytes.len());
    Ok(framing::atomic_json(status, bytes))
}
