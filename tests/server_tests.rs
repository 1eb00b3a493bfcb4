// HTTP surface tests
// These drive the router directly with tower's oneshot, no listener bound:
// status mapping, the no-cache headers on every response, and the
// source-address rate-limit wiring.

mod common;
use common::{setup_logging, StubGenerator};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, Request, Response, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use mirsal::models::Language;
use mirsal::pipeline::prompt::localized_error;
use mirsal::pipeline::{ChatPipeline, PipelineError, RateLimiter};
use mirsal::server::{router, AppState};

fn test_router(reply: &str) -> axum::Router {
    let (stub, _calls) = StubGenerator::new(reply);
    router(Arc::new(AppState {
        pipeline: ChatPipeline::new(Some("test-key".to_string()), stub),
        limiter: RateLimiter::default(),
    }))
}

/// Build a POST /api/chat request carrying the connect info the rate
/// limiter keys on.
fn chat_request(addr: &str, body: &str) -> Request<Body> {
    let addr: SocketAddr = addr.parse().expect("valid socket address");
    let mut request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request");
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

fn assert_no_cache_headers(response: &Response<Body>) {
    assert_eq!(
        response
            .headers()
            .get(header::CACHE_CONTROL)
            .expect("cache-control header present"),
        "no-store, no-cache, must-revalidate"
    );
    assert_eq!(
        response
            .headers()
            .get(header::PRAGMA)
            .expect("pragma header present"),
        "no-cache"
    );
}

async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}

#[tokio::test]
async fn test_chat_route_success_with_no_cache_headers() {
    setup_logging();
    let app = test_router("Hi there! Suggestions: Tell me more, Show pricing");

    let response = app
        .oneshot(chat_request(
            "203.0.113.7:40000",
            r#"{"messages":[{"role":"user","content":"hello"}],"language":"en"}"#,
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    assert_no_cache_headers(&response);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Hi there!");
    assert_eq!(
        body["suggestions"],
        serde_json::json!(["Tell me more", "Show pricing"])
    );
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_assistant_tail_returns_400_with_localized_error() {
    setup_logging();
    let app = test_router("never used");

    let response = app
        .oneshot(chat_request(
            "203.0.113.7:40000",
            r#"{"messages":[{"role":"user","content":"hello"},{"role":"assistant","content":"Hi!"}],"language":"en"}"#,
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_no_cache_headers(&response);

    let body = body_json(response).await;
    assert_eq!(
        body["error"],
        localized_error(
            Language::En,
            &PipelineError::InvalidRequest(String::new())
        )
    );
}

#[tokio::test]
async fn test_missing_credential_returns_500() {
    setup_logging();
    let (stub, _calls) = StubGenerator::new("never used");
    let app = router(Arc::new(AppState {
        pipeline: ChatPipeline::new(None, stub),
        limiter: RateLimiter::default(),
    }));

    let response = app
        .oneshot(chat_request(
            "203.0.113.7:40000",
            r#"{"messages":[{"role":"user","content":"hello"}],"language":"ar"}"#,
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_no_cache_headers(&response);

    let body = body_json(response).await;
    assert_eq!(
        body["error"],
        localized_error(Language::Ar, &PipelineError::MissingCredential)
    );
}

#[tokio::test]
async fn test_rate_limit_keyed_by_source_address() {
    setup_logging();
    let app = test_router("Hi there!");
    let body = r#"{"messages":[{"role":"user","content":"hello"}],"language":"ar"}"#;

    for i in 0..10 {
        let response = app
            .clone()
            .oneshot(chat_request("203.0.113.7:40000", body))
            .await
            .expect("router responds");
        assert_eq!(
            response.status(),
            StatusCode::OK,
            "request {} should be admitted",
            i + 1
        );
    }

    // 11th request from the same address is refused with the localized body
    let response = app
        .clone()
        .oneshot(chat_request("203.0.113.7:50000", body))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_no_cache_headers(&response);
    let rejected = body_json(response).await;
    assert_eq!(
        rejected["error"],
        localized_error(Language::Ar, &PipelineError::RateLimited)
    );

    // A different source address still has its own window
    let response = app
        .oneshot(chat_request("203.0.113.8:40000", body))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
}
