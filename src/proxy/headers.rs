//! Header utilities for upstream calls
//!
//! Client headers are never copied upstream. Each provider request carries
//! only the headers built here.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::{AppError, AppResult};

/// Build the headers for a chat-completion request
///
/// Only the proxy's own key is sent; the caller's `Authorization` header is dropped.
pub fn build_chat_headers(api_key: &str) -> AppResult<HeaderMap> {
    let mut headers = HeaderMap::new();

    let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|_| {
        AppError::ConfigMissing("DEEPSEEK_API_KEY contains invalid header characters".to_string())
    })?;
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(headers)
}
