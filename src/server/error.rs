//! API error bodies and status mapping

use crate::domain::{AnonymizationError, RedactorError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Error body: `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

/// API error detail
#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

/// A failed request: status plus body
#[derive(Debug)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub body: ApiError,
}

impl From<RedactorError> for ApiFailure {
    fn from(err: RedactorError) -> Self {
        let (status, code) = match &err {
            RedactorError::Validation(_) | RedactorError::Serialization(_) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST")
            }
            RedactorError::Anonymization(AnonymizationError::RecognitionUnavailable(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "RECOGNITION_UNAVAILABLE")
            }
            RedactorError::Anonymization(AnonymizationError::InvalidFieldContext(_))
            | RedactorError::Configuration(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
            }
            RedactorError::Anonymization(AnonymizationError::NotConverged { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "REDACTION_FAILED")
            }
            RedactorError::Storage(_) => (StatusCode::BAD_GATEWAY, "STORAGE_ERROR"),
            RedactorError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        Self {
            status,
            body: ApiError::new(code, err.to_string()),
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
