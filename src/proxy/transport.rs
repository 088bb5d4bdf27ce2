//! Upstream transport abstraction
//!
//! Every outbound call goes through `UpstreamTransport`, so the relay and the
//! provider clients can run against an in-process fake as well as `reqwest`.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{Stream, TryStreamExt};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use tracing::{debug, error};

use crate::error::{AppError, AppResult};

/// Boxed error carried by upstream body streams
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Body of an upstream response, read one chunk at a time
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, BoxError>> + Send>>;

/// Outbound request body
#[derive(Debug, Clone)]
pub enum UpstreamBody {
    /// Raw bytes, sent as-is
    Raw(Bytes),
    /// `application/x-www-form-urlencoded` pairs
    Form(Vec<(String, String)>),
}

/// A single outbound POST
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: UpstreamBody,
}

impl UpstreamRequest {
    pub fn raw(url: impl Into<String>, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            url: url.into(),
            headers,
            query: Vec::new(),
            body: UpstreamBody::Raw(body),
        }
    }

    pub fn form(url: impl Into<String>, fields: Vec<(String, String)>) -> Self {
        Self {
            url: url.into(),
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: UpstreamBody::Form(fields),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Upstream response with its body still unread
pub struct UpstreamResponse {
    pub status: StatusCode,
    /// `None` when the transport could not hand out a body reader
    pub body: Option<ByteStream>,
}

impl std::fmt::Debug for UpstreamResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamResponse")
            .field("status", &self.status)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

impl UpstreamResponse {
    /// Collect the whole body
    pub async fn into_bytes(self) -> AppResult<Bytes> {
        let Some(stream) = self.body else {
            return Ok(Bytes::new());
        };

        let collected = stream
            .try_fold(BytesMut::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok(acc)
            })
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to read upstream response: {}", e)))?;

        Ok(collected.freeze())
    }

    /// Collect the body and check it is a JSON document, returning the raw bytes untouched
    pub async fn into_json_bytes(self) -> AppResult<Bytes> {
        let bytes = self.into_bytes().await?;
        serde_json::from_slice::<serde::de::IgnoredAny>(&bytes).map_err(|e| {
            AppError::Upstream(format!("Upstream returned an invalid JSON body: {}", e))
        })?;
        Ok(bytes)
    }
}

/// Capability to send one request to an upstream provider
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    async fn send(&self, request: UpstreamRequest) -> AppResult<UpstreamResponse>;
}

/// `reqwest`-backed transport
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build the shared client. No total timeout is set so long streams are not cut off.
    pub fn build_client(connect_timeout: Duration) -> AppResult<reqwest::Client> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(32)
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(client)
    }
}

#[async_trait]
impl UpstreamTransport for HttpTransport {
    async fn send(&self, request: UpstreamRequest) -> AppResult<UpstreamResponse> {
        let mut builder = self.client.post(&request.url).headers(request.headers);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match request.body {
            UpstreamBody::Raw(bytes) => builder.body(bytes),
            UpstreamBody::Form(fields) => builder.form(&fields),
        };

        // Query strings may hold access tokens, so reqwest errors are stripped of their URL
        let response = builder.send().await.map_err(|e| {
            let e = e.without_url();
            error!(url = %request.url, error = %e, "Failed to send request upstream");
            e
        })?;

        debug!(url = %request.url, status = %response.status(), "Upstream responded");

        let status = response.status();
        let body: ByteStream = Box::pin(response
            .bytes_stream()
            .map_err(|e| Box::new(e.without_url()) as BoxError));

        Ok(UpstreamResponse {
            status,
            body: Some(body),
        })
    }
}
