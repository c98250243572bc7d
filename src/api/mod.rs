//! HTTP, WebSocket and SSE transports for the chat schema
//!
//! ## Endpoints
//! - `GET /health` - liveness and broker stats
//! - `POST /api/graphql` - queries and mutations
//! - `GET /api/graphql` - queries via URL parameters, or a WebSocket upgrade
//!   for subscriptions (`graphql-transport-ws` and legacy `graphql-ws`)
//! - `GET /api/graphql-ws` - WebSocket-only alias
//! - `GET /api/graphql/stream` - a single subscription over Server-Sent Events

pub mod auth;
pub mod graphql;
pub mod http;
pub mod sse;
pub mod state;
pub mod websocket;

use serde::{Deserialize, Serialize};

pub use auth::{AccessGate, Principal};
pub use http::create_router;
pub use state::AppState;

/// JSON body returned when a request is rejected before reaching the schema
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}
