//! `/api/voice-demo` behaviour against a mock voice service on real sockets.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;
use voice_bridge::bridge::WsConnector;
use voice_bridge::http::{build_router, AppState, X_REQUEST_ID};
use voice_bridge::ServiceConfig;

mod common;

fn router_for(config: &ServiceConfig) -> Router {
    let state = AppState::from_config(config, Arc::new(WsConnector)).unwrap();
    build_router(config, state)
}

fn post(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/voice-demo")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn healthy_status() -> (u16, Value) {
    (200, json!({"status": "healthy", "services": {"tts": "ok", "llm": "ok"}}))
}

#[tokio::test]
async fn test_ask_returns_reply() {
    let (tx, mut requests) = mpsc::unbounded_channel();
    let reply = json!({
        "type": "response",
        "reply_text": "Focus on retention.",
        "reply_audio_url": "https://cdn.example.com/a.mp3"
    });
    let addr = common::start_mock_voice_service(healthy_status(), common::replying(reply, tx)).await;
    let config = common::config_for(addr);

    let response = router_for(&config)
        .oneshot(post(
            json!({"persona": "CEO", "message": "What should we focus on next quarter?"}).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(X_REQUEST_ID));

    let body = json_body(response).await;
    assert_eq!(body["replyText"], "Focus on retention.");
    assert_eq!(body["replyAudioUrl"], "https://cdn.example.com/a.mp3");
    assert_eq!(body["persona"], "CEO");
    assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());

    let forwarded: Value = serde_json::from_str(&requests.recv().await.unwrap()).unwrap();
    assert_eq!(
        forwarded,
        json!({"type": "request", "persona": "CEO", "message": "What should we focus on next quarter?"})
    );
}

#[tokio::test]
async fn test_client_request_id_is_echoed() {
    let addr = common::unused_addr().await;
    let config = common::config_for(addr);

    let request = Request::builder()
        .uri("/healthz")
        .header(X_REQUEST_ID, "trace-me-42")
        .body(Body::empty())
        .unwrap();
    let response = router_for(&config).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[X_REQUEST_ID], "trace-me-42");
}

#[tokio::test]
async fn test_unknown_persona_is_bad_request() {
    let addr = common::unused_addr().await;
    let config = common::config_for(addr);

    let response = router_for(&config)
        .oneshot(post(json!({"persona": "Intern", "message": "hello"}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "validation_error");
    assert!(body["error"].as_str().unwrap().contains("CEO"));
}

#[tokio::test]
async fn test_oversized_message_is_bad_request() {
    let addr = common::unused_addr().await;
    let config = common::config_for(addr);

    let response = router_for(&config)
        .oneshot(post(json!({"persona": "CEO", "message": "m".repeat(501)}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("max 500"));
}

#[tokio::test]
async fn test_body_over_limit_is_bad_request() {
    let addr = common::unused_addr().await;
    let config = common::config_for(addr);
    assert!(config.security.max_body_size < 20_000);

    let response = router_for(&config)
        .oneshot(post(json!({"persona": "CEO", "message": "m".repeat(20_000)}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["kind"], "validation_error");
}

#[tokio::test]
async fn test_missing_fields_and_bad_json_are_bad_request() {
    let addr = common::unused_addr().await;
    let config = common::config_for(addr);

    for body in [
        json!({"persona": "CEO"}).to_string(),
        json!({"message": "hello"}).to_string(),
        "{not json".to_string(),
    ] {
        let response = router_for(&config).oneshot(post(body.clone())).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(json_body(response).await["kind"], "validation_error");
    }
}

#[tokio::test]
async fn test_remote_error_is_bad_gateway() {
    let (tx, _requests) = mpsc::unbounded_channel();
    let reply = json!({"type": "error", "message": "voice model offline"});
    let addr = common::start_mock_voice_service(healthy_status(), common::replying(reply, tx)).await;
    let config = common::config_for(addr);

    let response = router_for(&config)
        .oneshot(post(json!({"persona": "CTO", "message": "Status?"}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "protocol_error");
    assert!(body["error"].as_str().unwrap().contains("voice model offline"));
}

#[tokio::test]
async fn test_incomplete_reply_is_bad_gateway() {
    let (tx, _requests) = mpsc::unbounded_channel();
    let reply = json!({"type": "response", "text": "No audio for you"});
    let addr = common::start_mock_voice_service(healthy_status(), common::replying(reply, tx)).await;
    let config = common::config_for(addr);

    let response = router_for(&config)
        .oneshot(post(json!({"persona": "CFO", "message": "Budget?"}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(json_body(response).await["kind"], "invalid_response");
}

#[tokio::test]
async fn test_unreachable_service_is_unavailable() {
    let addr = common::unused_addr().await;
    let config = common::config_for(addr);

    let response = router_for(&config)
        .oneshot(post(json!({"persona": "CEO", "message": "Hello?"}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["kind"], "transport_error");
}

#[tokio::test]
async fn test_silent_service_is_gateway_timeout() {
    let addr = common::start_mock_voice_service(healthy_status(), common::silent).await;
    let mut config = common::config_for(addr);
    config.timeouts.response_ms = 300;

    let response = router_for(&config)
        .oneshot(post(json!({"persona": "CEO", "message": "Hello?"}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "response_timeout");
    assert!(body["error"].as_str().unwrap().contains("300ms"));
}

#[tokio::test]
async fn test_health_reports_healthy_service() {
    let addr = common::start_mock_voice_service(healthy_status(), common::silent).await;
    let config = common::config_for(addr);

    let response = router_for(&config).oneshot(get("/api/voice-demo")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["healthy"], true);
    assert_eq!(body["reachable"], true);
    assert_eq!(body["websocketAvailable"], true);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["tts"], "ok");
    assert_eq!(body["upstream"], format!("http://{}", addr));
}

#[tokio::test]
async fn test_health_without_upgrade_is_unhealthy() {
    let addr = common::start_status_only_service(healthy_status()).await;
    let config = common::config_for(addr);

    let response = router_for(&config).oneshot(get("/api/voice-demo")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["healthy"], false);
    assert_eq!(body["reachable"], true);
    assert_eq!(body["websocketAvailable"], false);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_health_with_error_status_is_unhealthy() {
    let addr = common::start_mock_voice_service((200, json!({"status": "error"})), common::silent).await;
    let config = common::config_for(addr);

    let response = router_for(&config).oneshot(get("/api/voice-demo")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["reachable"], true);
    assert_eq!(body["websocketAvailable"], true);
    assert_eq!(body["healthy"], false);
}

#[tokio::test]
async fn test_health_of_unreachable_service() {
    let addr = common::unused_addr().await;
    let config = common::config_for(addr);

    let response = router_for(&config).oneshot(get("/api/voice-demo")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["healthy"], false);
    assert_eq!(body["reachable"], false);
    assert_eq!(body["status"], "unreachable");
    assert_eq!(body["websocketAvailable"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_liveness() {
    let addr = common::unused_addr().await;
    let config = common::config_for(addr);

    let response = router_for(&config).oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}
