//! In-process upstream transport for tests
//!
//! Replies are scripted per URL suffix and every request is recorded, so tests
//! can assert both what reached the provider and what did not.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;

use crate::{
    error::{AppError, AppResult},
    proxy::transport::{BoxError, ByteStream, UpstreamRequest, UpstreamResponse, UpstreamTransport},
};

/// One scripted body item
#[derive(Debug, Clone)]
pub enum FakeChunk {
    Data(Bytes),
    Fail(String),
}

/// Scripted upstream reply
#[derive(Debug, Clone)]
pub struct FakeReply {
    pub status: StatusCode,
    pub chunks: Vec<FakeChunk>,
    /// Sleep before each chunk
    pub delay: Option<Duration>,
    /// Hand out no body reader at all
    pub no_body: bool,
}

impl FakeReply {
    pub fn json(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            chunks: vec![FakeChunk::Data(Bytes::copy_from_slice(body.as_bytes()))],
            delay: None,
            no_body: false,
        }
    }

    pub fn chunks<I, T>(chunks: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Bytes>,
    {
        Self {
            status: StatusCode::OK,
            chunks: chunks.into_iter().map(|c| FakeChunk::Data(c.into())).collect(),
            delay: None,
            no_body: false,
        }
    }

    pub fn without_body() -> Self {
        Self {
            status: StatusCode::OK,
            chunks: Vec::new(),
            delay: None,
            no_body: true,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn then_fail(mut self, message: &str) -> Self {
        self.chunks.push(FakeChunk::Fail(message.to_string()));
        self
    }

    fn into_body(self) -> Option<ByteStream> {
        if self.no_body {
            return None;
        }
        let delay = self.delay;
        let chunks = self.chunks;
        Some(Box::pin(async_stream::stream! {
            for chunk in chunks {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                match chunk {
                    FakeChunk::Data(bytes) => {
                        yield Ok::<Bytes, BoxError>(bytes);
                    }
                    FakeChunk::Fail(message) => {
                        yield Err(BoxError::from(message));
                        break;
                    }
                }
            }
        }))
    }
}

/// Transport that answers from a script instead of the network
#[derive(Default)]
pub struct FakeTransport {
    replies: Mutex<Vec<(String, FakeReply)>>,
    calls: Mutex<Vec<UpstreamRequest>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer requests whose URL ends with `suffix`
    pub fn on(&self, suffix: &str, reply: FakeReply) {
        self.replies
            .lock()
            .expect("fake transport lock poisoned")
            .push((suffix.to_string(), reply));
    }

    pub fn calls(&self) -> Vec<UpstreamRequest> {
        self.calls.lock().expect("fake transport lock poisoned").clone()
    }

    pub fn calls_to(&self, suffix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|request| request.url.ends_with(suffix))
            .count()
    }
}

#[async_trait]
impl UpstreamTransport for FakeTransport {
    async fn send(&self, request: UpstreamRequest) -> AppResult<UpstreamResponse> {
        let reply = self
            .replies
            .lock()
            .expect("fake transport lock poisoned")
            .iter()
            .find(|(suffix, _)| request.url.ends_with(suffix.as_str()))
            .map(|(_, reply)| reply.clone());

        let url = request.url.clone();
        self.calls
            .lock()
            .expect("fake transport lock poisoned")
            .push(request);

        let reply = reply.ok_or_else(|| AppError::Upstream(format!("connection refused: {}", url)))?;

        Ok(UpstreamResponse {
            status: reply.status,
            body: reply.into_body(),
        })
    }
}
