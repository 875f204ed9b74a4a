// src/routes/whatsapp.rs
use axum::{
    Json,
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::{
    error::AppError,
    message::{Ack, text_of},
    services::relay,
    state::SharedState,
};

pub async fn status_handler(State(state): State<SharedState>) -> Result<Json<Value>, AppError> {
    Ok(Json(state.upstream.get_status().await?))
}

pub async fn qr_handler(State(state): State<SharedState>) -> Result<Json<Value>, AppError> {
    Ok(Json(state.upstream.get_qr_code().await?))
}

pub async fn send_handler(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let (to, message) = parse_send_request(&body)?;
    Ok(Json(state.upstream.send_message(&to, &message).await?))
}

pub async fn logout_handler(State(state): State<SharedState>) -> Result<Json<Value>, AppError> {
    Ok(Json(state.upstream.logout().await?))
}

/// Delivery callback from the WhatsApp service.
pub async fn receive_handler(State(state): State<SharedState>, body: Bytes) -> Response {
    relay_response(relay::handle_received_message(&state.upstream, &body).await)
}

/// Pull `to` and `message` out of the body. Numbers are accepted and rendered in decimal.
fn parse_send_request(body: &[u8]) -> Result<(String, String), AppError> {
    let no_data = || AppError::InvalidArgument("No JSON data provided".into());
    let payload: Value = serde_json::from_slice(body).map_err(|_| no_data())?;
    let fields = match payload.as_object() {
        Some(fields) if !fields.is_empty() => fields,
        _ => return Err(no_data()),
    };

    let to = fields.get("to").map(text_of).unwrap_or_default();
    let message = fields.get("message").map(text_of).unwrap_or_default();
    if to.is_empty() || message.is_empty() {
        return Err(AppError::InvalidArgument(
            "Missing required fields: to, message".into(),
        ));
    }
    Ok((to, message))
}

/// Relay endpoints answer unexpected failures with `{status: "error", message}`.
pub(crate) fn relay_response(result: Result<Ack, AppError>) -> Response {
    match result {
        Ok(ack) => Json(ack).into_response(),
        Err(AppError::Internal(message)) => {
            tracing::error!(error = %message, "relay handler failed");
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                Json(Ack::error(message)),
            )
                .into_response()
        }
        Err(err) => err.into_response(),
    }
}
