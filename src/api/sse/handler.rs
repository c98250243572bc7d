//! SSE handler

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Extension, Json,
};
use futures::StreamExt;

use super::{COMPLETE_EVENT, NEXT_EVENT};
use crate::api::auth::Principal;
use crate::api::graphql::{subject, GraphQlParams};
use crate::api::state::AppState;
use crate::api::ApiError;

/// Comment frame interval keeping idle streams open through proxies
pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// GET /api/graphql/stream
pub async fn graphql_stream(
    State(state): State<Arc<AppState>>,
    principal: Option<Extension<Principal>>,
    Query(params): Query<GraphQlParams>,
) -> Response {
    let request = match params.into_request() {
        Ok(request) => request,
        Err(err) => {
            state.service.report(&err, None);
            let body = ApiError::new(err.to_string(), err.code());
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };
    tracing::debug!(subject = subject(&principal), "Opening GraphQL event stream");

    let mut responses = state.schema.execute_stream(request);

    let stream = async_stream::stream! {
        while let Some(response) = responses.next().await {
            match Event::default().event(NEXT_EVENT).json_data(&response) {
                Ok(event) => yield Ok::<_, Infallible>(event),
                Err(e) => tracing::error!(error = %e, "Failed to encode SSE event"),
            }
        }
        yield Ok::<_, Infallible>(Event::default().event(COMPLETE_EVENT).data(""));
    };

    Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL).text("keep-alive"))
        .into_response()
}
