use std::time::Duration;

use imagera::gemini::{GeminiClient, InlineImage, ModelClient, ModelError, ModelRequest};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn client(server: &MockServer, timeout: Duration) -> GeminiClient {
    GeminiClient::new(server.uri(), "test-key", timeout).unwrap()
}

fn request() -> ModelRequest {
    ModelRequest {
        model: "gemini-2.5-flash".to_string(),
        prompt: "Describe the lighting".to_string(),
        images: vec![InlineImage {
            mime_type: "image/png".to_string(),
            data: "AQID".to_string(),
        }],
    }
}

fn candidate(parts: Value) -> Value {
    json!({ "candidates": [{ "content": { "role": "model", "parts": parts } }] })
}

#[tokio::test]
async fn test_generate_posts_inline_parts_and_returns_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(json!([
            { "text": "Soft window light " },
            { "text": "from the left." }
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let text = client(&server, Duration::from_secs(5))
        .generate(&request())
        .await
        .unwrap();
    assert_eq!(text, "Soft window light from the left.");

    let received = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&received[0].body).unwrap();
    let parts = &body["contents"][0]["parts"];
    assert_eq!(body["contents"][0]["role"], "user");
    assert_eq!(parts[0]["text"], "Describe the lighting");
    assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
    assert_eq!(parts[1]["inline_data"]["data"], "AQID");
}

#[tokio::test]
async fn test_error_status_becomes_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let err = client(&server, Duration::from_secs(5))
        .generate(&request())
        .await
        .unwrap_err();

    match err {
        ModelError::Api { status, body } => {
            assert_eq!(status.as_u16(), 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_json_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client(&server, Duration::from_secs(5))
        .generate(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::Decode(_)));
}

#[tokio::test]
async fn test_blocked_prompt_is_an_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "promptFeedback": { "blockReason": "SAFETY" } })),
        )
        .mount(&server)
        .await;

    let err = client(&server, Duration::from_secs(5))
        .generate(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::EmptyResponse));
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(candidate(json!([{ "text": "late" }])))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let err = client(&server, Duration::from_millis(50))
        .generate(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::Http(_)));
}

#[tokio::test]
async fn test_trailing_slash_in_base_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(json!([{ "text": "ok" }]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(format!("{}/", server.uri()), "test-key", Duration::from_secs(5)).unwrap();
    assert_eq!(client.generate(&request()).await.unwrap(), "ok");
}
