//! Router tests: access gate, GraphQL over HTTP and the SSE stream

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chat_relay::api::{create_router, AccessGate, AppState};
use chat_relay::{ChatEvents, ChatService, MemoryStore};
use serde_json::{json, Value};
use tower::util::ServiceExt;

const KEY: &str = "function-key-1";
const SECRET: &str = "integration-secret-that-is-at-least-32-chars";

fn setup() -> (Router, Arc<ChatService>, Arc<AppState>) {
    let service = Arc::new(ChatService::new(Arc::new(MemoryStore::new()), ChatEvents::new()));
    let gate = AccessGate::new(vec![KEY.to_string()], Some(SECRET));
    let state = Arc::new(AppState::new(service.clone(), gate));
    (create_router(state.clone()), service, state)
}

fn post_graphql() -> axum::http::request::Builder {
    Request::builder()
        .method("POST")
        .uri("/api/graphql")
        .header(header::CONTENT_TYPE, "application/json")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_reports_environment() {
    let (app, _, _) = setup();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["startedAt"].is_string());
}

#[tokio::test]
async fn test_missing_credentials_rejected_and_reported() {
    let (app, service, _) = setup();
    let mut errors = service.subscribe_errors();

    let body = json!({ "query": "{ conversations { id } }" });
    let response = app
        .oneshot(post_graphql().body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHENTICATED");

    let reported = errors.try_recv().expect("rejection published on errors topic");
    assert_eq!(reported.code, "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_function_key_header_admits_request() {
    let (app, _, _) = setup();
    let body = json!({
        "query": "mutation Start($model: String!) { startConversation(model: $model) { model } }",
        "variables": { "model": "gpt-4" }
    });
    let response = app
        .oneshot(
            post_graphql()
                .header("x-functions-key", KEY)
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["startConversation"]["model"], "gpt-4");
}

#[tokio::test]
async fn test_wrong_function_key_rejected() {
    let (app, _, _) = setup();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/graphql?query=%7Bconversations%7Bid%7D%7D&code=nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_with_code_query_parameter() {
    let (app, _, _) = setup();
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!(
                    "/api/graphql?query=%7BmodelCapabilities%7Bname%7D%7D&code={}",
                    KEY
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(!json["data"]["modelCapabilities"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_bearer_token_permissions() {
    let (app, _, state) = setup();
    let allowed = state.gate.issue_token("alice", vec!["chat".to_string()]).unwrap();
    let denied = state.gate.issue_token("bob", vec!["read".to_string()]).unwrap();

    let request = |token: &str| {
        Request::builder()
            .uri("/api/graphql?query=%7Bconversations%7Bid%7D%7D")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(request(&allowed)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["conversations"], json!([]));

    let response = app.oneshot(request(&denied)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_get_without_query_is_bad_request() {
    let (app, _, _) = setup();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/graphql")
                .header("x-functions-key", KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_open_gate_in_development() {
    let service = Arc::new(ChatService::new(Arc::new(MemoryStore::new()), ChatEvents::new()));
    let app = create_router(Arc::new(AppState::new(service, AccessGate::open())));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/graphql?query=%7Bconversations%7Bid%7D%7D")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_sse_stream_sends_next_then_complete() {
    let (app, _, _) = setup();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/graphql/stream?query=%7BmodelCapabilities%7Bname%7D%7D")
                .header("x-functions-key", KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let next = text.find("event: next").expect("next event");
    let complete = text.find("event: complete").expect("complete event");
    assert!(next < complete);
    assert!(text.contains("claude-3-opus-20240229"));
}
