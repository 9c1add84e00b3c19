//! Middleware for access-token validation
//!
//! Verifies the Bearer token and resolves its subject to a live user
//! record. A token whose subject is missing or deactivated is rejected
//! even when the signature is still valid.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{AppState, error::AuthError, models::Role};

/// Authenticated caller, resolved against the users table
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// Extract and validate the access token from the Authorization header
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(AuthError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::Unauthorized)?;

    let claims = state
        .jwt_service
        .validate_token(token)
        .map_err(|_| AuthError::Unauthorized)?;

    let user = state
        .user_repository
        .find_by_id(claims.sub)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    if !user.is_active {
        return Err(AuthError::Unauthorized);
    }

    req.extensions_mut().insert(AuthenticatedUser {
        id: user.id,
        email: user.email,
        name: user.name,
        role: user.role,
    });

    Ok(next.run(req).await)
}
