use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("profile not found with id: {id}")]
    NotFound { id: String },

    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    Conflict(String),

    #[error("primary store error: {0}")]
    Store(#[from] sqlx::Error),
}

/// Cache failures never cross the service boundary; they are logged and
/// the operation degrades to store-only behavior.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    #[error("cache payload error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Unavailable(err.to_string())
    }
}

/// Event publication is fire-and-forget; failures are logged by the caller.
#[derive(Error, Debug)]
pub enum EventError {
    #[error("event sink unavailable: {0}")]
    Unavailable(String),
}

impl From<redis::RedisError> for EventError {
    fn from(err: redis::RedisError) -> Self {
        EventError::Unavailable(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    status: u16,
    error: &'static str,
    message: String,
    errors: Vec<FieldError>,
    timestamp: DateTime<Utc>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, label, message) = match &self {
            Error::NotFound { .. } => (StatusCode::NOT_FOUND, "Not Found", self.to_string()),
            Error::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "Validation Failed",
                "Validation failed for request".to_string(),
            ),
            Error::Conflict(_) => (StatusCode::CONFLICT, "Conflict", self.to_string()),
            Error::Store(e) => {
                error!("primary store failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let errors = match self {
            Error::Validation(errors) => errors,
            _ => Vec::new(),
        };

        let body = ErrorBody {
            status: status.as_u16(),
            error: label,
            message,
            errors,
            timestamp: Utc::now(),
        };
        (status, Json(body)).into_response()
    }
}
