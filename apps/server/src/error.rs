//! Error type shared by the availability engine, the store and the handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ApiResponse;

#[derive(Debug, Error)]
pub enum SchedulingError {
    /// Rejected input: missing or unparseable dates, out-of-bounds limits.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Craftsman {0} not found")]
    CraftsmanNotFound(i64),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Persistence failure. Fatal for the current request.
    #[error("Database error: {0}")]
    Database(String),
}

impl SchedulingError {
    pub fn validation(msg: impl Into<String>) -> Self {
        SchedulingError::Validation(msg.into())
    }
}

impl From<sqlx::Error> for SchedulingError {
    fn from(e: sqlx::Error) -> Self {
        SchedulingError::Database(e.to_string())
    }
}

impl IntoResponse for SchedulingError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            SchedulingError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            SchedulingError::CraftsmanNotFound(_) | SchedulingError::NotFound(_) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            SchedulingError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "DB error".to_string())
            }
        };

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}
