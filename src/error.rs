// src/error.rs
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Required request fields are missing or empty.
    #[error("{0}")]
    InvalidArgument(String),

    /// The WhatsApp service could not be reached (refused, timed out, unreadable reply).
    #[error("WhatsApp service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("{0}")]
    NotFound(String),

    /// The WhatsApp service answered with a non-success status; relayed as-is.
    #[error("WhatsApp service returned {status}")]
    Upstream { status: StatusCode, body: Value },

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream { status, .. } => *status,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        // A request that could not even be built never left the process.
        if err.is_builder() {
            AppError::Internal(err.to_string())
        } else {
            AppError::UpstreamUnavailable(err.to_string())
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        } else {
            tracing::warn!(%status, error = %self, "request rejected");
        }

        let body = match self {
            AppError::InvalidArgument(msg) | AppError::NotFound(msg) | AppError::Conflict(msg) => {
                json!({ "error": msg })
            }
            AppError::UpstreamUnavailable(details) => json!({
                "error": "WhatsApp service unavailable",
                "details": details,
            }),
            AppError::Upstream { body, .. } => body,
            AppError::Internal(details) => json!({
                "error": "Internal server error",
                "details": details,
            }),
        };

        (status, Json(body)).into_response()
    }
}
