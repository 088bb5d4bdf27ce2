//! Mock OCR provider for testing
//!
//! Provides wiremock-based mocks for:
//! - POST /oauth/2.0/token - client-credentials token grant
//! - POST /rest/2.0/ocr/v1/{accurate,general} - recognition

use serde_json::{json, Value};
use wiremock::{
    matchers::{body_string_contains, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use crate::common::constants;

pub const TOKEN_PATH: &str = "/oauth/2.0/token";
pub const OCR_BASE_PATH: &str = "/rest/2.0/ocr/v1";

/// Mock OCR provider server wrapper
pub struct MockOcrProvider {
    server: MockServer,
}

impl MockOcrProvider {
    /// Start a new mock OCR server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    pub fn token_url(&self) -> String {
        format!("{}{}", self.server.uri(), TOKEN_PATH)
    }

    pub fn api_url(&self) -> String {
        format!("{}{}", self.server.uri(), OCR_BASE_PATH)
    }

    /// Requests received on `path_suffix`
    pub async fn received_on(&self, path_suffix: &str) -> Vec<wiremock::Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path().ends_with(path_suffix))
            .collect()
    }

    /// Mock a successful token grant, called exactly `times` times
    pub async fn mock_token_success(&self, times: u64) {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains(format!("client_id={}", constants::TEST_OCR_API_KEY)))
            .and(body_string_contains(format!("client_secret={}", constants::TEST_OCR_SECRET_KEY)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": constants::TEST_OCR_TOKEN,
                "expires_in": 2592000,
                "scope": "public brain_all_scope"
            })))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Mock a token reply that is 200 but carries no token
    pub async fn mock_token_without_access_token(&self) {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"expires_in": 2592000})))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Mock a token endpoint failure
    pub async fn mock_token_error(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Mock a recognition endpoint (`accurate` or `general`), called exactly `times` times
    pub async fn mock_recognition(&self, endpoint: &str, body: Value, times: u64) {
        Mock::given(method("POST"))
            .and(path(format!("{}/{}", OCR_BASE_PATH, endpoint)))
            .and(query_param("access_token", constants::TEST_OCR_TOKEN))
            .and(body_string_contains("image="))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Any call to the token endpoint fails the test when the server is dropped
    pub async fn expect_no_token_calls(&self) {
        Mock::given(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    /// Any recognition call fails the test when the server is dropped
    pub async fn expect_no_recognition_calls(&self) {
        for endpoint in ["accurate", "general"] {
            Mock::given(path(format!("{}/{}", OCR_BASE_PATH, endpoint)))
                .respond_with(ResponseTemplate::new(500))
                .expect(0)
                .mount(&self.server)
                .await;
        }
    }
}

/// Sample OCR payloads
pub struct OcrTestData;

impl OcrTestData {
    pub fn words_result() -> Value {
        json!({
            "log_id": 1234567890_u64,
            "words_result_num": 2,
            "words_result": [
                {"words": "欢迎光临", "location": {"top": 10, "left": 12, "width": 80, "height": 20}},
                {"words": "Welcome", "location": {"top": 40, "left": 12, "width": 70, "height": 18}}
            ]
        })
    }

    /// Small base64 payload standing in for an image
    pub fn image_data() -> &'static str {
        "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg=="
    }

    pub fn invalid_client_error() -> Value {
        json!({"error": "invalid_client", "error_description": "unknown client id"})
    }
}
