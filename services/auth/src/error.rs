//! Custom error types for the identity service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for authentication operations
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed or missing request fields
    #[error("{0}")]
    Validation(String),

    /// Multiple field-level validation failures
    #[error("Validation failed")]
    ValidationMany(Vec<String>),

    /// Missing, invalid, or expired credentials
    #[error("Unauthorized")]
    Unauthorized,

    /// Unique-constraint conflict (duplicate email)
    #[error("{0}")]
    Conflict(String),

    /// Brute-force lockout engaged
    #[error("Too many attempts, please try again later")]
    RateLimited,

    /// Unexpected failure
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for AuthError {
    fn from(e: sqlx::Error) -> Self {
        AuthError::Internal(anyhow::Error::new(e))
    }
}

impl AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) | AuthError::ValidationMany(_) => StatusCode::BAD_REQUEST,
            AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::Conflict(_) => StatusCode::CONFLICT,
            AuthError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details go to the log, not the client
        if let AuthError::Internal(e) = &self {
            error!("Internal error: {:#}", e);
        }

        let body = match &self {
            AuthError::ValidationMany(details) => json!({
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::Conflict("dup".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(AuthError::RateLimited.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }
}
