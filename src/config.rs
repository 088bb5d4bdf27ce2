//! Configuration management for the proxy
//!
//! Configuration is loaded once from environment variables at startup and
//! handed to every handler through `AppState`.

use std::env;
use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::error::{AppError, AppResult};

/// Identity header the mobile app sends on every call
pub const BUNDLE_ID_HEADER: &str = "x-bundle-id";

/// Secret string that must never appear in logs or responses
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Credential for the chat-completion provider
#[derive(Debug, Clone)]
pub struct ChatCredential {
    pub api_key: Secret,
}

/// Client-credentials pair for the OCR provider
#[derive(Debug, Clone)]
pub struct OcrCredential {
    pub api_key: Secret,
    pub secret_key: Secret,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Expected value of the `x-bundle-id` header
    pub bundle_id: String,

    /// Chat-completion endpoint URL
    pub chat_api_url: String,
    /// Chat provider credential, `None` when `DEEPSEEK_API_KEY` is unset
    pub chat_credential: Option<ChatCredential>,

    /// OCR token endpoint URL
    pub ocr_token_url: String,
    /// Base URL of the OCR recognition endpoints
    pub ocr_api_url: String,
    /// OCR credential pair, `None` unless both keys are set
    pub ocr_credential: Option<OcrCredential>,

    /// Connect timeout for upstream calls
    pub connect_timeout: Duration,
    /// Maximum wait for the next upstream chunk while relaying a stream
    pub stream_idle_timeout: Option<Duration>,
    /// Largest accepted inbound body; base64 images are big
    pub max_body_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let chat_credential = non_empty("DEEPSEEK_API_KEY").map(|key| ChatCredential {
            api_key: Secret::new(key),
        });

        let ocr_credential = match (non_empty("BAIDU_API_KEY"), non_empty("BAIDU_SECRET_KEY")) {
            (Some(api_key), Some(secret_key)) => Some(OcrCredential {
                api_key: Secret::new(api_key),
                secret_key: Secret::new(secret_key),
            }),
            _ => None,
        };

        let connect_timeout_secs: u64 = var("UPSTREAM_CONNECT_TIMEOUT_SECS", "10")
            .parse()
            .context("Invalid UPSTREAM_CONNECT_TIMEOUT_SECS")?;

        let idle_timeout_secs: u64 = var("STREAM_IDLE_TIMEOUT_SECS", "120")
            .parse()
            .context("Invalid STREAM_IDLE_TIMEOUT_SECS")?;

        Ok(Self {
            host: var("PROXY_HOST", "0.0.0.0"),
            port: var("PROXY_PORT", "8080")
                .parse()
                .context("Invalid PROXY_PORT")?,

            bundle_id: var("APP_BUNDLE_ID", "com.rantao.ChinaGo"),

            chat_api_url: var("DEEPSEEK_API_URL", "https://api.deepseek.com/chat/completions"),
            chat_credential,

            ocr_token_url: var("BAIDU_TOKEN_URL", "https://aip.baidubce.com/oauth/2.0/token"),
            ocr_api_url: var("BAIDU_OCR_URL", "https://aip.baidubce.com/rest/2.0/ocr/v1"),
            ocr_credential,

            connect_timeout: Duration::from_secs(connect_timeout_secs),
            stream_idle_timeout: (idle_timeout_secs > 0)
                .then(|| Duration::from_secs(idle_timeout_secs)),
            max_body_bytes: var("MAX_BODY_BYTES", &(20 * 1024 * 1024).to_string())
                .parse()
                .context("Invalid MAX_BODY_BYTES")?,
        })
    }

    /// Chat credential, or `ConfigMissing` when the route was never configured
    pub fn require_chat_credential(&self) -> AppResult<&ChatCredential> {
        self.chat_credential.as_ref().ok_or_else(|| {
            AppError::ConfigMissing("DEEPSEEK_API_KEY environment variable is not set".to_string())
        })
    }

    /// OCR credential pair, or `ConfigMissing` when either half is absent
    pub fn require_ocr_credential(&self) -> AppResult<&OcrCredential> {
        self.ocr_credential.as_ref().ok_or_else(|| {
            AppError::ConfigMissing(
                "BAIDU_API_KEY or BAIDU_SECRET_KEY environment variable is not set".to_string(),
            )
        })
    }
}
