// src/message.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /send-message` on the WhatsApp service.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct SendMessageRequest {
    pub to: String,
    pub message: String,
}

/// Strings as-is, numbers (bare phone numbers) in decimal, anything else empty.
pub fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Acknowledgement returned by the relay endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct Ack {
    pub status: String,
    pub message: String,
}

impl Ack {
    pub fn success(message: impl Into<String>) -> Self {
        Self { status: "success".into(), message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { status: "error".into(), message: message.into() }
    }
}

/// Frame pushed to realtime clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub event: String,
    pub data: Value,
}

impl Event {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self { event: event.into(), data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_of_accepts_strings_and_numbers() {
        assert_eq!(text_of(&json!("628123")), "628123");
        assert_eq!(text_of(&json!(628123)), "628123");
        assert_eq!(text_of(&json!(null)), "");
        assert_eq!(text_of(&json!(true)), "");
        assert_eq!(text_of(&json!({ "a": 1 })), "");
    }
}
