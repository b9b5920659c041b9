//! HTTP gateway (Axum) receiving chat message events.
//!
//! A transport bridge (for example a Discord gateway forwarder) posts each `MESSAGE_CREATE`
//! it sees to `/v1/messages`.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use handler::message_handler;
pub use state::HandlerState;

/// Response header describing how the gateway treated a request.
pub const RELAY_STATUS_HEADER: &str = "x-relay-status";

pub fn create_router_with_state(state: HandlerState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/v1/messages", post(message_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub instance_id: String,
}

#[tracing::instrument(skip(state))]
pub async fn health_handler(State(state): State<HandlerState>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(RELAY_STATUS_HEADER, HeaderValue::from_static("healthy"));

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse {
            status: "ok",
            instance_id: state.dispatcher.instance_id().to_string(),
        }),
    )
        .into_response()
}
