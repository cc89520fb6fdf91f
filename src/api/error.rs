//! API error responses, rendered as `{"detail": "..."}`

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

/// Error returned by an API handler
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or invalid request (400)
    BadRequest(String),
    /// Anything else (500); the message is logged, never returned
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            Self::Internal(message) => {
                error!(error = %message, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<rumbo_core::Error> for ApiError {
    fn from(err: rumbo_core::Error) -> Self {
        match err {
            rumbo_core::Error::Validation(detail) => Self::BadRequest(detail),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
