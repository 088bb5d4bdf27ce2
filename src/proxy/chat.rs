//! Chat-completion upstream client
//!
//! Forwards the caller's body bytes unchanged, so fields like `stream` reach
//! the provider exactly as the client wrote them.

use std::sync::Arc;

use bytes::Bytes;
use tracing::instrument;

use crate::{
    config::{ChatCredential, Config},
    error::AppResult,
    proxy::{
        headers::build_chat_headers,
        transport::{UpstreamRequest, UpstreamResponse, UpstreamTransport},
    },
};

/// Client for the chat-completion provider
pub struct ChatClient {
    transport: Arc<dyn UpstreamTransport>,
    url: String,
}

impl ChatClient {
    pub fn new(transport: Arc<dyn UpstreamTransport>, config: &Config) -> Self {
        Self {
            transport,
            url: config.chat_api_url.clone(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one POST carrying `body` verbatim. The response body is left unread.
    #[instrument(skip_all, fields(url = %self.url, body_len = body.len()))]
    pub async fn forward(
        &self,
        credential: &ChatCredential,
        body: Bytes,
    ) -> AppResult<UpstreamResponse> {
        let headers = build_chat_headers(credential.api_key.expose())?;
        let request = UpstreamRequest::raw(self.url.clone(), headers, body);

        self.transport.send(request).await
    }
}
