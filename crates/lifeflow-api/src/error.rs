//! API error translation
//!
//! Every failure a handler can produce ends up here, and this is the only
//! place that decides HTTP status codes. Store errors pass through unchanged
//! until [`From<StoreError>`] maps them.
//!
//! | Variant | Status |
//! |---|---|
//! | `InvalidInput` | 400 |
//! | `Unauthorized` | 401 |
//! | `NotFound` | 404 |
//! | `Conflict` | 409 |
//! | `Internal` | 500 |
//! | `StoreUnavailable` | 503 |
//!
//! The body is always `{"success": false, "error": "<message>"}`.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lifeflow_store::StoreError;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    StoreUnavailable(String),

    #[error("{0}")]
    Internal(String),
}

/// Error envelope
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn habit_not_found() -> Self {
        ApiError::NotFound("Habit not found".to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        if e.is_retryable() {
            return ApiError::StoreUnavailable(e.to_string());
        }
        match e {
            StoreError::NotFound(_) => ApiError::habit_not_found(),
            StoreError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            StoreError::Conflict(msg) => ApiError::Conflict(format!("Already exists: {}", msg)),
            StoreError::Unavailable(msg) => ApiError::StoreUnavailable(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal details stay in the log; clients get a generic message
        let message = match &self {
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                "Internal server error".to_string()
            }
            ApiError::StoreUnavailable(detail) => {
                tracing::error!(error = %detail, "store unavailable");
                "Service temporarily unavailable, please retry".to_string()
            }
            ApiError::Unauthorized(msg) | ApiError::Conflict(msg) => {
                tracing::warn!(status = status.as_u16(), error = %msg, "request rejected");
                msg.clone()
            }
            ApiError::InvalidInput(msg) | ApiError::NotFound(msg) => {
                tracing::debug!(status = status.as_u16(), error = %msg, "request rejected");
                msg.clone()
            }
        };

        let body = ErrorResponse {
            success: false,
            error: message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_taxonomy() {
        let cases = [
            (StoreError::NotFound("h1".into()), StatusCode::NOT_FOUND),
            (StoreError::InvalidInput("bad".into()), StatusCode::BAD_REQUEST),
            (StoreError::Conflict("h1".into()), StatusCode::CONFLICT),
            (
                StoreError::Unavailable("slow".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                StoreError::DatabaseError(sqlx::Error::PoolTimedOut),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                StoreError::CorruptRow("category".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                StoreError::DatabaseError(sqlx::Error::RowNotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (store_error, expected) in cases {
            assert_eq!(ApiError::from(store_error).status(), expected);
        }
    }

    #[test]
    fn test_not_found_does_not_echo_id() {
        let err = ApiError::from(StoreError::NotFound("someone-elses-habit".into()));
        assert_eq!(err.to_string(), "Habit not found");
    }
}
