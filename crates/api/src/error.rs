//! API error type and its HTTP mapping
//!
//! Maps database errors onto the status codes the REST surface exposes:
//! not-found and validation problems surface as 404/400 with a JSON
//! body; infrastructure failures are logged and reported as a bare 500.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use taskboard_db::DbError;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by request handlers
#[derive(Error, Debug)]
pub enum ApiError {
    /// The record does not exist within the caller's owner scope
    #[error("{0}")]
    NotFound(String),

    /// The request carried an unusable value or violated a constraint
    #[error("{0}")]
    Validation(String),

    /// An infrastructure failure; details are logged, not leaked
    #[error(transparent)]
    Internal(DbError),
}

impl ApiError {
    /// Shorthand for a not-found error on a given entity kind.
    pub fn not_found(entity: &str, id: &str) -> Self {
        ApiError::NotFound(format!("{} '{}' not found", entity, id))
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::Validation { message } => ApiError::Validation(message),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, detail) = match self {
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "not_found", detail),
            ApiError::Validation(detail) => (StatusCode::BAD_REQUEST, "invalid", detail),
            ApiError::Internal(err) => {
                error!("Internal error handling request: {}", err.full_message());
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal server error.".to_string(),
                )
            }
        };

        let body = json!({ "error": kind, "detail": detail });
        (status, Json(body)).into_response()
    }
}
