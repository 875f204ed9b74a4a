// src/services/relay.rs
use serde_json::Value;

use crate::{
    error::AppError,
    message::{Ack, text_of},
    services::{
        broadcast::{Broadcaster, WEBHOOK_TOPIC},
        upstream::{AUTO_REPLY_TIMEOUT, UpstreamClient},
    },
};

pub const PING: &str = "ping";
pub const PONG: &str = "pong";

/// Accept any JSON payload and rebroadcast it unchanged to realtime clients.
pub async fn handle_generic_webhook(broadcaster: &Broadcaster, body: &[u8]) -> Result<Ack, AppError> {
    let payload = parse_payload(body)?;
    tracing::info!(%payload, "webhook received");

    let delivered = broadcaster.publish(WEBHOOK_TOPIC, payload).await;
    tracing::debug!(delivered, "webhook rebroadcast to realtime clients");
    Ok(Ack::success("Webhook received"))
}

/// Delivery callback from the WhatsApp service. Answers "ping" with "pong".
///
/// The auto-reply is best effort: its failure is logged and never changes the acknowledgement.
pub async fn handle_received_message(upstream: &UpstreamClient, body: &[u8]) -> Result<Ack, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(no_data());
    }
    let payload = parse_payload(body)?;
    if is_blank(&payload) {
        return Err(no_data());
    }
    let Some(fields) = payload.as_object() else {
        return Err(AppError::Internal("payload must be a JSON object".into()));
    };
    tracing::info!(%payload, "received WhatsApp message");

    let text = fields.get("message").map(text_of).unwrap_or_default();
    if is_ping(&text) {
        let sender = fields.get("from").map(text_of).unwrap_or_default();
        auto_reply(upstream, &sender).await;
    }

    Ok(Ack::success("Message received and processed"))
}

/// Exact match on "ping" after trimming and lowercasing.
pub fn is_ping(text: &str) -> bool {
    text.trim().to_lowercase() == PING
}

async fn auto_reply(upstream: &UpstreamClient, sender: &str) {
    match upstream.send_message_within(sender, PONG, AUTO_REPLY_TIMEOUT).await {
        Ok(_) => tracing::info!(to = sender, "auto-reply sent"),
        Err(err) => tracing::warn!(to = sender, error = %err, "failed to send auto-reply"),
    }
}

fn parse_payload(body: &[u8]) -> Result<Value, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::Internal(e.to_string()))
}

fn no_data() -> AppError {
    AppError::InvalidArgument("No JSON data provided".into())
}

/// `null`, `false`, `0`, `""`, `[]` and `{}` carry no data.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
