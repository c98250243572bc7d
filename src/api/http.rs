//! HTTP server setup with Axum

use std::sync::Arc;

use axum::{
    extract::State,
    middleware,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::require_access;
use super::graphql::{graphql_get, graphql_post, graphql_ws};
use super::sse::graphql_stream;
use super::state::AppState;

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    // The SPA is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let graphql = Router::new()
        .route("/api/graphql", get(graphql_get).post(graphql_post))
        .route("/api/graphql-ws", get(graphql_ws))
        .route("/api/graphql/stream", get(graphql_stream))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_access));

    Router::new()
        .route("/health", get(health_check))
        .merge(graphql)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Health {
    status: &'static str,
    environment: &'static str,
    started_at: String,
    active_conversations: usize,
    error_subscribers: usize,
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> Json<Health> {
    let events = state.service.events();
    Json(Health {
        status: "ok",
        environment: state.environment().as_str(),
        started_at: state.started_at.to_rfc3339(),
        active_conversations: events.active_conversations(),
        error_subscribers: events.error_subscriber_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AccessGate;
    use crate::broker::ChatEvents;
    use crate::service::ChatService;
    use crate::store::MemoryStore;
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    fn app(gate: AccessGate) -> Router {
        let service = Arc::new(ChatService::new(Arc::new(MemoryStore::new()), ChatEvents::new()));
        create_router(Arc::new(AppState::new(service, gate)))
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = app(AccessGate::open())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["environment"], "development");
    }

    #[tokio::test]
    async fn test_health_is_not_gated() {
        let gate = AccessGate::new(vec!["key".to_string()], None);
        let response = app(gate)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn test_graphql_rejects_missing_key() {
        let gate = AccessGate::new(vec!["key".to_string()], None);
        let response = app(gate)
            .oneshot(
                Request::builder()
                    .uri("/api/graphql?query=%7Bconversations%7Bid%7D%7D")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 401);
    }
}
