//! OCR proxy integration tests
//!
//! - Missing image data is rejected before the token call
//! - Token then recognition, on the endpoint chosen by `useAccurate`
//! - Token failures stop the request before recognition

use axum::http::{HeaderName, HeaderValue, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use assist_proxy::{config::BUNDLE_ID_HEADER, routes};

use crate::common::{constants, TestHarness};
use crate::mocks::{OcrTestData, TOKEN_PATH};

fn identity() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static(BUNDLE_ID_HEADER),
        HeaderValue::from_static(constants::TEST_BUNDLE_ID),
    )
}

#[tokio::test]
async fn test_missing_image_data_skips_every_upstream_call() {
    let harness = TestHarness::new().await;
    harness.ocr.expect_no_token_calls().await;
    harness.ocr.expect_no_recognition_calls().await;

    for body in [json!({"useAccurate": true}), json!({"imageData": ""})] {
        let (name, value) = identity();
        let response = harness
            .server
            .post(routes::OCR_ROUTE)
            .add_header(name, value)
            .json(&body)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>(), json!({"error": "Missing image data"}));
    }
}

#[tokio::test]
async fn test_general_recognition_by_default() {
    let harness = TestHarness::new().await;
    harness.ocr.mock_token_success(1).await;
    harness
        .ocr
        .mock_recognition("general", OcrTestData::words_result(), 1)
        .await;
    harness.ocr.mock_recognition("accurate", json!({}), 0).await;

    let (name, value) = identity();
    let response = harness
        .server
        .post(routes::OCR_ROUTE)
        .add_header(name, value)
        .json(&json!({"imageData": OcrTestData::image_data()}))
        .await;

    response.assert_status_ok();
    assert_eq!(response.headers()["content-type"], "application/json");
    assert_eq!(response.json::<Value>(), OcrTestData::words_result());
}

#[tokio::test]
async fn test_accurate_flag_changes_only_the_recognition_endpoint() {
    let harness = TestHarness::new().await;
    harness.ocr.mock_token_success(2).await;
    harness
        .ocr
        .mock_recognition("accurate", OcrTestData::words_result(), 1)
        .await;
    harness
        .ocr
        .mock_recognition("general", OcrTestData::words_result(), 1)
        .await;

    for accurate in [true, false] {
        let (name, value) = identity();
        harness
            .server
            .post(routes::OCR_ROUTE)
            .add_header(name, value)
            .json(&json!({
                "imageData": OcrTestData::image_data(),
                "useAccurate": accurate,
                "needTranslation": true,
                "targetLanguage": "ENG"
            }))
            .await
            .assert_status_ok();
    }

    let tokens = harness.ocr.received_on(TOKEN_PATH).await;
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].body, tokens[1].body);
}

#[tokio::test]
async fn test_image_is_sent_form_encoded() {
    let harness = TestHarness::new().await;
    harness.ocr.mock_token_success(1).await;
    harness
        .ocr
        .mock_recognition("general", OcrTestData::words_result(), 1)
        .await;

    let (name, value) = identity();
    harness
        .server
        .post(routes::OCR_ROUTE)
        .add_header(name, value)
        .json(&json!({"imageData": OcrTestData::image_data()}))
        .await
        .assert_status_ok();

    let recognitions = harness.ocr.received_on("/general").await;
    assert_eq!(recognitions.len(), 1);
    let body = String::from_utf8_lossy(&recognitions[0].body).to_string();
    assert!(body.starts_with("image=iVBORw0KGgo"), "body: {}", body);
    // Base64 '+' must be percent-encoded or the provider reads it as a space
    assert!(!body.contains('+'));
    assert!(body.contains("%2B"));
    assert!(recognitions[0].url.query().unwrap().contains("access_token="));
    assert_eq!(
        recognitions[0].headers["content-type"],
        "application/x-www-form-urlencoded"
    );
}

#[tokio::test]
async fn test_token_without_access_token_stops_before_recognition() {
    let harness = TestHarness::new().await;
    harness.ocr.mock_token_without_access_token().await;
    harness.ocr.expect_no_recognition_calls().await;

    let (name, value) = identity();
    let response = harness
        .server
        .post(routes::OCR_ROUTE)
        .add_header(name, value)
        .json(&json!({"imageData": OcrTestData::image_data()}))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>(),
        json!({"error": "Failed to obtain OCR access token"})
    );
}

#[tokio::test]
async fn test_token_rejection_reports_provider_message() {
    let harness = TestHarness::new().await;
    harness
        .ocr
        .mock_token_error(401, OcrTestData::invalid_client_error())
        .await;
    harness.ocr.expect_no_recognition_calls().await;

    let (name, value) = identity();
    let response = harness
        .server
        .post(routes::OCR_ROUTE)
        .add_header(name, value)
        .json(&json!({"imageData": OcrTestData::image_data()}))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let error = response.json::<Value>()["error"].as_str().unwrap().to_string();
    assert!(error.contains("unknown client id"), "error: {}", error);
}

#[tokio::test]
async fn test_token_failure_without_body_reports_status() {
    let harness = TestHarness::new().await;
    harness.ocr.mock_token_error(503, json!({})).await;
    harness.ocr.expect_no_recognition_calls().await;

    let (name, value) = identity();
    let response = harness
        .server
        .post(routes::OCR_ROUTE)
        .add_header(name, value)
        .json(&json!({"imageData": OcrTestData::image_data()}))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>(),
        json!({"error": "Failed to get OCR access token: 503"})
    );
}

#[tokio::test]
async fn test_oversized_body_gets_json_envelope() {
    let harness = TestHarness::with_config(|config| assist_proxy::Config {
        max_body_bytes: 64,
        ..config
    })
    .await;
    harness.ocr.expect_no_token_calls().await;

    let (name, value) = identity();
    let response = harness
        .server
        .post(routes::OCR_ROUTE)
        .add_header(name, value)
        .json(&json!({"imageData": "A".repeat(200)}))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.headers()["content-type"], "application/json");
    assert_eq!(
        response.json::<Value>(),
        json!({"error": "Request body too large"})
    );
}
