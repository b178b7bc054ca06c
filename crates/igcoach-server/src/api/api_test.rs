use axum::body::{to_bytes, Body};
use axum::http::Request;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

const TEST_KEY: &str = "test-api-key";

fn test_app(llm_base_url: &str) -> Router {
    let llm = ChatClient::with_base_url("sk-test", "gpt-test", 5, llm_base_url)
        .expect("client")
        .with_temperature(0.3);
    let state = AppState {
        llm,
        report_language: Arc::from("English"),
        privacy_page: Arc::from(privacy::DEFAULT_PRIVACY_PAGE),
    };
    let auth = AuthState::new(vec![TEST_KEY.to_owned()]);
    build_app(state, auth, &["http://localhost".to_owned()])
}

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "gpt-test",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

fn analyze_request(api_key: Option<&str>, body: &serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    builder
        .body(Body::from(serde_json::to_vec(body).expect("serialize body")))
        .expect("request")
}

fn sample_body() -> serde_json::Value {
    serde_json::json!({
        "account_url": "https://instagram.com/acme",
        "follower_count": 1000,
        "goals": ["grow reach"],
        "posts": [
            { "id": "p1", "type": "Reel", "date": "2024-01-01", "likes": 90, "comments": 10, "views": 2000 },
            { "id": "p2", "type": "photo", "date": "2024-01-04", "likes": 40, "caption": "sunset" }
        ]
    })
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json parse")
}

#[test]
fn api_error_upstream_error_maps_to_bad_gateway() {
    let response = ApiError::new("req-1", "upstream_error", "boom").into_response();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[test]
fn api_error_unknown_code_maps_to_internal_error() {
    let response = ApiError::new("req-1", "internal_error", "boom").into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn health_is_public_and_tags_request_id() {
    let app = test_app("http://127.0.0.1:9");
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-abc")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-abc")
    );
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn privacy_page_is_public_html() {
    let app = test_app("http://127.0.0.1:9");
    let response = app
        .oneshot(
            Request::builder()
                .uri("/privacy")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    assert!(content_type.starts_with("text/html"), "got {content_type}");
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    assert!(String::from_utf8_lossy(&bytes).contains("Privacy Policy"));
}

#[tokio::test]
async fn analyze_rejects_missing_api_key() {
    let app = test_app("http://127.0.0.1:9");
    let response = app
        .oneshot(analyze_request(None, &sample_body()))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "unauthorized");
    assert!(json["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn analyze_rejects_wrong_api_key() {
    let app = test_app("http://127.0.0.1:9");
    let response = app
        .oneshot(analyze_request(Some("nope"), &sample_body()))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn analyze_returns_sectioned_report() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "Hook 7/10\nRetention 6/10\n2) Hooks start too slowly\n3) Lead with the payoff\n4)\n- Week 1: rewrite hooks\n• Week 2: post 4 reels",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let app = test_app(&format!("{}/v1", server.uri()));
    let response = app
        .oneshot(analyze_request(Some(TEST_KEY), &sample_body()))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["account_url"], "https://instagram.com/acme");
    assert_eq!(json["scorecard"]["raw"], "Hook 7/10\nRetention 6/10");
    assert_eq!(json["diagnostics"]["raw"], "Hooks start too slowly");
    assert_eq!(json["recommendations"]["raw"], "Lead with the payoff");
    assert_eq!(
        json["plan_30d"],
        serde_json::json!(["Week 1: rewrite hooks", "Week 2: post 4 reels"])
    );
}

#[tokio::test]
async fn analyze_sends_summary_and_samples_to_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .mount(&server)
        .await;

    let app = test_app(&format!("{}/v1", server.uri()));
    let response = app
        .oneshot(analyze_request(Some(TEST_KEY), &sample_body()))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).expect("json");
    assert_eq!(sent["model"], "gpt-test");
    assert_eq!(sent["messages"][0]["role"], "system");
    assert!(sent["messages"][0]["content"]
        .as_str()
        .is_some_and(|s| s.contains("English")));

    let user = sent["messages"][1]["content"].as_str().expect("user prompt");
    assert!(user.contains("\"n\":2"), "summary missing: {user}");
    assert!(user.contains("\"avg_gap_days\":3.0"), "gap missing: {user}");
    assert!(user.contains("\"id\":\"p2\""));
    assert!(user.contains("\"type\":\"reel\""));
}

#[tokio::test]
async fn analyze_maps_model_failure_to_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let app = test_app(&format!("{}/v1", server.uri()));
    let response = app
        .oneshot(analyze_request(Some(TEST_KEY), &sample_body()))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(json_body(response).await["error"]["code"], "upstream_error");
}

#[tokio::test]
async fn analyze_rejects_body_without_account_url() {
    let app = test_app("http://127.0.0.1:9");
    let response = app
        .oneshot(analyze_request(
            Some(TEST_KEY),
            &serde_json::json!({ "posts": [] }),
        ))
        .await
        .expect("response");

    assert!(response.status().is_client_error(), "got {}", response.status());
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let app = test_app("http://127.0.0.1:9");
    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/analyze")
                .header("origin", "http://localhost")
                .header("access-control-request-method", "POST")
                .header("access-control-request-headers", "x-api-key,content-type")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost")
    );
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-credentials")
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-methods")
            .and_then(|v| v.to_str().ok()),
        Some("POST")
    );
}

#[tokio::test]
async fn cors_preflight_mirrors_any_requested_method() {
    let app = test_app("http://127.0.0.1:9");
    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/analyze")
                .header("origin", "http://localhost")
                .header("access-control-request-method", "DELETE")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-methods")
            .and_then(|v| v.to_str().ok()),
        Some("DELETE")
    );
}

#[test]
fn build_cors_accepts_wildcard_without_panicking() {
    let _layer = build_cors(&["*".to_owned()]);
}
