//! Error types for mxp-ex
//!
//! [`ExportError`] is what the job runner returns. Validation and admission
//! failures reach the submitter synchronously; everything that goes wrong
//! inside a running job is caught at the task boundary and recorded as a
//! failed job. [`ApiError`] maps both onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extractor::ExtractError;
use crate::resolver::ResolveError;
use crate::source::SourceError;

/// Export runner error
#[derive(Debug, Error)]
pub enum ExportError {
    /// Bad request; nothing was recorded
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Too many queued or running jobs; nothing was recorded
    #[error("Export queue full ({limit} jobs queued or running)")]
    Busy { limit: usize },

    #[error("Media source error: {0}")]
    Source(#[from] SourceError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] mxp_common::Error),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("Export cancelled")]
    Cancelled,
}

impl From<ResolveError> for ExportError {
    fn from(err: ResolveError) -> Self {
        ExportError::Validation(err.to_string())
    }
}

impl From<sqlx::Error> for ExportError {
    fn from(err: sqlx::Error) -> Self {
        ExportError::Persistence(mxp_common::Error::Database(err))
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409): export queue full, or artifact not ready
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Common error: {0}")]
    Common(#[from] mxp_common::Error),
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Validation(msg) => ApiError::BadRequest(msg),
            ExportError::Busy { .. } => ApiError::Conflict(err.to_string()),
            ExportError::Persistence(e) => ApiError::Common(e),
            ExportError::Filesystem(e) => ApiError::Io(e),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Io(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "IO_ERROR",
                err.to_string(),
            ),
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
