//! Error types for opcon-agg
//!
//! Every handler failure becomes the failure envelope
//! `{"ok": false, "error": "<message>"}` with a matching HTTP status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use opcon_common::api::{Envelope, ErrorEnvelope};
use thiserror::Error;
use tracing::error;

/// Service error
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed request field (400)
    #[error("{0}")]
    Validation(String),

    /// Unknown operator, media item or session (404)
    #[error("{0}")]
    NotFound(String),

    /// Request conflicts with the session lifecycle (409)
    #[error("{0}")]
    Conflict(String),

    /// Database connection or query errors (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored data that cannot be interpreted (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(ErrorEnvelope::new(self.to_string()))).into_response()
    }
}

/// Convenience Result type for service operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Handler result: success envelope or failure envelope
pub type ApiResult<T> = std::result::Result<Json<Envelope<T>>, ApiError>;

/// Wrap a body in the success envelope
pub fn ok<T>(body: T) -> ApiResult<T> {
    Ok(Json(Envelope::ok(body)))
}
