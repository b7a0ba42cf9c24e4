//! API error types mapped to HTTP status codes.
//!
//! Failures are rendered as `{"success": false, "error": ..., "details": ...}`:
//! - `Validation` → 400
//! - `NotFound` → 404
//! - `Internal` → 500 (configuration, embedding provider, store)

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rag_service::ServiceError;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::error;

/// Request-level failure.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or out-of-range request (400).
    Validation { error: String, details: Value },
    /// Nothing matched (404).
    NotFound { error: String, details: Value },
    /// Unexpected server error (500).
    Internal { error: String, details: Value },
}

impl ApiError {
    pub fn validation(details: impl Into<Value>) -> Self {
        ApiError::Validation {
            error: "Invalid request".to_string(),
            details: details.into(),
        }
    }

    pub fn not_found(error: impl Into<String>, details: impl Into<Value>) -> Self {
        ApiError::NotFound {
            error: error.into(),
            details: details.into(),
        }
    }

    pub fn internal(details: impl Into<Value>) -> Self {
        ApiError::Internal {
            error: "Internal server error".to_string(),
            details: details.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => ApiError::validation(msg),
            e if e.is_not_found() => ApiError::not_found("Document not found", e.to_string()),
            e => {
                error!(error = %e, "Request failed");
                ApiError::internal(e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, details) = match self {
            ApiError::Validation { error, details }
            | ApiError::NotFound { error, details }
            | ApiError::Internal { error, details } => (error, details),
        };
        let body = axum::Json(json!({
            "success": false,
            "error": error,
            "details": details,
        }));
        (status, body).into_response()
    }
}

/// Failures starting the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configured CORS origin is not a valid header value
    #[error("Invalid CORS origin: {0}")]
    InvalidOrigin(String),

    /// Bind or serve failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
