//! GraphQL over HTTP

use std::sync::Arc;

use axum::{
    extract::{ws::WebSocketUpgrade, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use tracing::Instrument;

use super::auth::Principal;
use super::state::AppState;
use super::websocket::{self, WsProtocol};
use super::ApiError;
use crate::error::ChatServiceError;

/// URL parameters of a GET request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlParams {
    pub query: Option<String>,
    pub operation_name: Option<String>,
    /// JSON-encoded variables object
    pub variables: Option<String>,
}

impl GraphQlParams {
    pub fn into_request(self) -> Result<async_graphql::Request, ChatServiceError> {
        let query = self
            .query
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| ChatServiceError::invalid_request("missing 'query' parameter"))?;

        let mut request = async_graphql::Request::new(query);
        if let Some(name) = self.operation_name {
            request = request.operation_name(name);
        }
        if let Some(raw) = self.variables.filter(|v| !v.trim().is_empty()) {
            let value: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
                ChatServiceError::invalid_request(format!("'variables' is not valid JSON: {}", e))
            })?;
            request = request.variables(async_graphql::Variables::from_json(value));
        }
        Ok(request)
    }
}

/// POST /api/graphql
pub async fn graphql_post(
    State(state): State<Arc<AppState>>,
    principal: Option<Extension<Principal>>,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    Json(execute(&state, request, principal).await)
}

/// GET /api/graphql - URL-encoded query, or a WebSocket upgrade
pub async fn graphql_get(
    State(state): State<Arc<AppState>>,
    principal: Option<Extension<Principal>>,
    headers: HeaderMap,
    ws: Option<WebSocketUpgrade>,
    Query(params): Query<GraphQlParams>,
) -> Response {
    if let Some(ws) = ws {
        return upgrade(state, &headers, ws, subject(&principal));
    }

    match params.into_request() {
        Ok(request) => Json(execute(&state, request, principal).await).into_response(),
        Err(err) => {
            state.service.report(&err, None);
            let body = ApiError::new(err.to_string(), err.code());
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
    }
}

/// GET /api/graphql-ws
pub async fn graphql_ws(
    State(state): State<Arc<AppState>>,
    principal: Option<Extension<Principal>>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    upgrade(state, &headers, ws, subject(&principal))
}

fn upgrade(
    state: Arc<AppState>,
    headers: &HeaderMap,
    ws: WebSocketUpgrade,
    subject: &str,
) -> Response {
    let protocol = WsProtocol::negotiate(headers);
    tracing::debug!(protocol = protocol.as_str(), subject, "Upgrading to subscription socket");
    ws.protocols([protocol.as_str()])
        .on_upgrade(move |socket| websocket::serve(socket, state, protocol))
}

/// Caller name for log fields; routes outside the gate have none
pub(crate) fn subject(principal: &Option<Extension<Principal>>) -> &str {
    match principal {
        Some(Extension(principal)) => &principal.subject,
        None => "anonymous",
    }
}

async fn execute(
    state: &AppState,
    request: async_graphql::Request,
    principal: Option<Extension<Principal>>,
) -> async_graphql::Response {
    let span = tracing::info_span!("graphql", subject = subject(&principal));
    state.schema.execute(request).instrument(span).await
}
