//! OCR upstream client
//!
//! Two calls per recognition: a client-credentials token request, then the
//! recognition call with the token as a query parameter.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::{
    config::{Config, OcrCredential},
    error::{AppError, AppResult},
    proxy::transport::{UpstreamRequest, UpstreamResponse, UpstreamTransport},
};

const GENERIC_TOKEN_FAILURE: &str = "Failed to obtain OCR access token";

/// Recognition flavour selected by `useAccurate`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrEndpoint {
    Accurate,
    General,
}

impl OcrEndpoint {
    pub fn from_accurate_flag(use_accurate: bool) -> Self {
        if use_accurate {
            OcrEndpoint::Accurate
        } else {
            OcrEndpoint::General
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            OcrEndpoint::Accurate => "accurate",
            OcrEndpoint::General => "general",
        }
    }
}

/// Token endpoint reply. Both the success and the error shapes share one object.
#[derive(Debug, Default, Deserialize)]
struct TokenReply {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl TokenReply {
    /// Upstream's own explanation, if it gave one
    fn upstream_message(&self) -> Option<String> {
        self.error_description
            .clone()
            .or_else(|| self.error.clone())
            .filter(|m| !m.trim().is_empty())
    }
}

/// Client for the OCR provider
pub struct OcrClient {
    transport: Arc<dyn UpstreamTransport>,
    token_url: String,
    api_url: String,
}

impl OcrClient {
    pub fn new(transport: Arc<dyn UpstreamTransport>, config: &Config) -> Self {
        Self {
            transport,
            token_url: config.ocr_token_url.clone(),
            api_url: config.ocr_api_url.trim_end_matches('/').to_string(),
        }
    }

    /// URL of the recognition endpoint, without the token
    pub fn recognition_url(&self, endpoint: OcrEndpoint) -> String {
        format!("{}/{}", self.api_url, endpoint.path())
    }

    /// Obtain an access token with the client-credentials grant
    #[instrument(skip_all, fields(url = %self.token_url))]
    pub async fn fetch_access_token(&self, credential: &OcrCredential) -> AppResult<String> {
        let request = UpstreamRequest::form(
            self.token_url.clone(),
            vec![
                ("grant_type".to_string(), "client_credentials".to_string()),
                ("client_id".to_string(), credential.api_key.expose().to_string()),
                ("client_secret".to_string(), credential.secret_key.expose().to_string()),
            ],
        );

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| AppError::TokenFailure(format!("{}: {}", GENERIC_TOKEN_FAILURE, e)))?;

        let status = response.status;
        let body = response
            .into_bytes()
            .await
            .map_err(|e| AppError::TokenFailure(format!("{}: {}", GENERIC_TOKEN_FAILURE, e)))?;
        let reply: Option<TokenReply> = serde_json::from_slice(&body).ok();

        if !status.is_success() {
            warn!(status = %status, "Token endpoint returned non-success");
            let message = reply
                .as_ref()
                .and_then(TokenReply::upstream_message)
                .unwrap_or_else(|| {
                    format!("Failed to get OCR access token: {}", status.as_u16())
                });
            return Err(AppError::TokenFailure(message));
        }

        let reply = reply.unwrap_or_default();
        match reply.access_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => {
                debug!("Access token obtained");
                Ok(token.to_string())
            }
            _ => {
                warn!("Token endpoint reply carried no access token");
                Err(AppError::TokenFailure(
                    reply
                        .upstream_message()
                        .unwrap_or_else(|| GENERIC_TOKEN_FAILURE.to_string()),
                ))
            }
        }
    }

    /// Submit the base64 image for recognition. The response body is left unread.
    #[instrument(skip_all, fields(endpoint = %endpoint.path(), image_len = image_data.len()))]
    pub async fn recognize(
        &self,
        access_token: &str,
        endpoint: OcrEndpoint,
        image_data: &str,
    ) -> AppResult<UpstreamResponse> {
        let request = UpstreamRequest::form(
            self.recognition_url(endpoint),
            vec![("image".to_string(), image_data.to_string())],
        )
        .with_query("access_token", access_token);

        self.transport.send(request).await
    }
}
