// src/services/upstream.rs
use std::time::Duration;

use axum::http::StatusCode;
use reqwest::{Client, Response, Url};
use serde_json::Value;

use crate::{error::AppError, message::SendMessageRequest};

/// Timeout for status and QR lookups.
pub const READ_TIMEOUT: Duration = Duration::from_secs(5);
/// Timeout for sends and logout.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout for the ping/pong auto-reply.
pub const AUTO_REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for the external WhatsApp service.
///
/// Every call is a one-shot request with its own timeout; no idle connections are kept,
/// so a restarted service is picked up on the next call.
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    http: Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(base_url: &Url) -> Result<Self, AppError> {
        let http = Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// `GET /status`, body returned verbatim.
    pub async fn get_status(&self) -> Result<Value, AppError> {
        let response = self
            .http
            .get(self.endpoint("status"))
            .timeout(READ_TIMEOUT)
            .send()
            .await?;
        read_json(response).await
    }

    /// `GET /qr`. Anything but 200 means no QR code is waiting to be scanned.
    pub async fn get_qr_code(&self) -> Result<Value, AppError> {
        let response = self
            .http
            .get(self.endpoint("qr"))
            .timeout(READ_TIMEOUT)
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            tracing::debug!(status = %response.status(), "no QR code from WhatsApp service");
            return Err(AppError::NotFound("QR code not available".into()));
        }
        read_json(response).await
    }

    /// `POST /send-message {to, message}`.
    pub async fn send_message(&self, to: &str, message: &str) -> Result<Value, AppError> {
        self.send_message_within(to, message, WRITE_TIMEOUT).await
    }

    pub async fn send_message_within(
        &self,
        to: &str,
        message: &str,
        timeout: Duration,
    ) -> Result<Value, AppError> {
        if to.is_empty() || message.is_empty() {
            return Err(AppError::InvalidArgument(
                "Missing required fields: to, message".into(),
            ));
        }

        let payload = SendMessageRequest {
            to: to.to_string(),
            message: message.to_string(),
        };
        tracing::debug!(to, "forwarding message to WhatsApp service");
        let response = self
            .http
            .post(self.endpoint("send-message"))
            .json(&payload)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        let body = read_json(response).await?;
        if status == StatusCode::OK {
            Ok(body)
        } else {
            Err(AppError::Upstream { status, body })
        }
    }

    /// `POST /logout`, body returned verbatim.
    pub async fn logout(&self) -> Result<Value, AppError> {
        let response = self
            .http
            .post(self.endpoint("logout"))
            .timeout(WRITE_TIMEOUT)
            .send()
            .await?;
        read_json(response).await
    }
}

async fn read_json(response: Response) -> Result<Value, AppError> {
    Ok(response.json::<Value>().await?)
}
