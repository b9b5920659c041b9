use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{Instrument, debug, info_span, instrument};
use uuid::Uuid;

use super::RELAY_STATUS_HEADER;
use super::error::GatewayError;
use super::payload::DispatchAccepted;
use super::state::HandlerState;
use crate::chat::InboundMessage;

/// Accepts one chat message event.
///
/// Recognised commands run on their own task so concurrent messages never wait on each
/// other; the reply is `202 Accepted`. Ignored messages get `204 No Content`.
#[instrument(skip(state, request))]
pub async fn message_handler(
    State(state): State<HandlerState>,
    Json(request): Json<serde_json::Value>,
) -> Result<Response, GatewayError> {
    let message: InboundMessage = serde_json::from_value(request)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid message schema: {}", e)))?;

    let Some(command) = state.dispatcher.accept(&message) else {
        debug!(channel_id = %message.channel_id, "Message ignored");
        let mut headers = HeaderMap::new();
        headers.insert(RELAY_STATUS_HEADER, HeaderValue::from_static("ignored"));
        return Ok((StatusCode::NO_CONTENT, headers).into_response());
    };

    let request_id = Uuid::new_v4();
    let span = info_span!(
        "command",
        %request_id,
        command = command.name(),
        author = %message.author.id
    );
    let dispatcher = state.dispatcher.clone();
    let channel_id = message.channel_id;
    tokio::spawn(
        async move {
            dispatcher.dispatch(command, &channel_id).await;
        }
        .instrument(span),
    );

    let mut headers = HeaderMap::new();
    headers.insert(RELAY_STATUS_HEADER, HeaderValue::from_static("accepted"));
    let body = Json(DispatchAccepted {
        status: "accepted".to_string(),
        command: command.name().to_string(),
        request_id: request_id.to_string(),
    });
    Ok((StatusCode::ACCEPTED, headers, body).into_response())
}
