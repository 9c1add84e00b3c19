//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for the API service
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing request fields
    #[error("{0}")]
    Validation(String),

    /// Multiple field-level validation failures
    #[error("Validation failed")]
    ValidationMany(Vec<String>),

    /// Missing, invalid, or expired credentials
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated but not entitled
    #[error("{0}")]
    Forbidden(String),

    /// Entity absent
    #[error("{0}")]
    NotFound(String),

    /// Unique-constraint conflict
    #[error("{0}")]
    Conflict(String),

    /// Gift card invalid or balance insufficient
    #[error("{0}")]
    Payment(String),

    /// Database failure
    #[error("A database error occurred")]
    Database(#[from] sqlx::Error),

    /// Unexpected failure
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::ValidationMany(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Payment(_) => StatusCode::PAYMENT_REQUIRED,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details go to the log, not the client
        match &self {
            ApiError::Database(e) => error!("Database error: {}", e),
            ApiError::Internal(e) => error!("Internal error: {:#}", e),
            _ => {}
        }

        let body = match &self {
            ApiError::ValidationMany(details) => json!({
                "success": false,
                "error": self.to_string(),
                "details": details,
            }),
            _ => json!({
                "success": false,
                "error": self.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Forbidden("no".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("gone".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("dup".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Payment("insufficient".into()).status_code(),
            StatusCode::PAYMENT_REQUIRED
        );
    }

    #[test]
    fn test_messages_are_client_facing() {
        assert_eq!(
            ApiError::NotFound("Show not found".into()).to_string(),
            "Show not found"
        );
        assert_eq!(
            ApiError::Database(sqlx::Error::PoolClosed).to_string(),
            "A database error occurred"
        );
    }
}
