//! Assist Proxy - authenticated relay for chat-completion and OCR providers
//!
//! This library provides the core of the proxy server: the identity gate,
//! the upstream clients, the streaming relay and the response framing.

pub mod config;
pub mod error;
pub mod framing;
pub mod middleware;
pub mod proxy;
pub mod routes;
pub mod streaming;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

pub use crate::config::Config;
pub use crate::error::{AppError, AppResult};
pub use crate::proxy::{ChatClient, HttpTransport, OcrClient, UpstreamTransport};

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    pub start_time: Instant,
    /// Chat-completion provider client
    pub chat: ChatClient,
    /// OCR provider client
    pub ocr: OcrClient,
}

impl AppState {
    /// Create the application state with the real HTTP transport
    pub fn new(config: Config) -> Result<Self> {
        let client = HttpTransport::build_client(config.connect_timeout)?;
        let transport: Arc<dyn UpstreamTransport> = Arc::new(HttpTransport::new(client));

        Ok(Self::with_transport(config, transport))
    }

    /// Create the application state over any transport
    pub fn with_transport(config: Config, transport: Arc<dyn UpstreamTransport>) -> Self {
        let chat = ChatClient::new(transport.clone(), &config);
        let ocr = OcrClient::new(transport, &config);

        Self {
            config,
            start_time: Instant::now(),
            chat,
            ocr,
        }
    }
}
