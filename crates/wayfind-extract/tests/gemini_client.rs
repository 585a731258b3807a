//! Integration tests for `GeminiClient` using wiremock HTTP mocks.

use wayfind_core::{Citation, GroundingTool};
use wayfind_extract::{
    GeminiClient, GenerateError, GenerateRequest, Generator, Transient, UpstreamError,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-2.5-flash";
const ENDPOINT: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn test_client(base_url: &str) -> GeminiClient {
    GeminiClient::with_base_url("test-key", MODEL, 30, base_url)
        .expect("client construction should not fail")
}

fn request(grounding: GroundingTool) -> GenerateRequest {
    GenerateRequest {
        prompt: "Find the places in this article.".to_string(),
        grounding,
    }
}

#[tokio::test]
async fn generate_returns_text_and_grounding_citations() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [
                    {"text": "```json\n{\"summary\":\"s\","},
                    {"text": "\"places\":[]}\n```"}
                ]
            },
            "groundingMetadata": {
                "groundingChunks": [
                    {"maps": {"uri": "https://maps.google.com/?cid=1", "title": "Ichiran Nakasu"}},
                    {"web": {"uri": "https://example.com/guide", "title": "Fukuoka guide"}},
                    {"retrievedContext": {"uri": "gs://bucket/doc"}}
                ]
            }
        }]
    });

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "contents": [{"role": "user"}],
            "tools": [{"googleMaps": {}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let generation = client
        .generate(&request(GroundingTool::GoogleMaps))
        .await
        .expect("should parse generation");

    assert_eq!(
        generation.text,
        "```json\n{\"summary\":\"s\",\"places\":[]}\n```"
    );
    assert_eq!(
        generation.evidence,
        vec![
            Citation::Map {
                title: Some("Ichiran Nakasu".to_string()),
                uri: Some("https://maps.google.com/?cid=1".to_string()),
            },
            Citation::Web {
                title: Some("Fukuoka guide".to_string()),
                uri: Some("https://example.com/guide".to_string()),
            },
        ]
    );
}

#[tokio::test]
async fn generate_without_grounding_metadata_has_no_evidence() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "candidates": [{"content": {"parts": [{"text": "{\"summary\":\"s\",\"places\":[]}"}]}}]
    });
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let generation = client
        .generate(&request(GroundingTool::None))
        .await
        .expect("should parse generation");
    assert!(generation.evidence.is_empty());
}

#[tokio::test]
async fn overloaded_envelope_maps_to_transient_api_error() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "error": {
            "code": 503,
            "message": "The model is overloaded. Please try again later.",
            "status": "UNAVAILABLE"
        }
    });
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(503).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .generate(&request(GroundingTool::GoogleMaps))
        .await
        .unwrap_err();

    assert!(err.is_transient());
    match err {
        GenerateError::Api(UpstreamError {
            status,
            api_status,
            message,
        }) => {
            assert_eq!(status, Some(503));
            assert_eq!(api_status.as_deref(), Some("UNAVAILABLE"));
            assert!(message.unwrap().contains("overloaded"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn permission_denied_is_not_transient() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "error": {
            "code": 403,
            "message": "Method doesn't allow unregistered callers.",
            "status": "PERMISSION_DENIED"
        }
    });
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(403).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .generate(&request(GroundingTool::GoogleMaps))
        .await
        .unwrap_err();

    assert!(!err.is_transient());
    assert!(matches!(
        err,
        GenerateError::Api(UpstreamError { status: Some(403), .. })
    ));
}

#[tokio::test]
async fn error_without_envelope_keeps_http_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .generate(&request(GroundingTool::GoogleMaps))
        .await
        .unwrap_err();

    assert!(err.is_transient());
    assert_eq!(
        err.to_string(),
        "model API error: unknown error (status 500)"
    );
}

#[tokio::test]
async fn missing_candidates_is_empty_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .generate(&request(GroundingTool::GoogleMaps))
        .await
        .unwrap_err();

    assert!(matches!(err, GenerateError::EmptyResponse));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn non_json_success_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .generate(&request(GroundingTool::GoogleMaps))
        .await
        .unwrap_err();

    assert!(matches!(err, GenerateError::Deserialize { .. }));
}
