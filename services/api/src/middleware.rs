//! Authentication middleware and role checks
//!
//! Validates the access token issued by the identity service and resolves
//! its subject to a live user record before any handler runs. Role gating
//! is an exact membership check done per handler via `require_role`.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::env;
use uuid::Uuid;

use crate::{error::ApiError, models::Role, state::AppState};

/// JWT claims structure, as issued by the identity service
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// User email at issue time
    pub email: String,
    /// User role at issue time
    pub role: Role,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// Access-token verifier, built once at startup
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a verifier from the shared secret
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: HMAC secret shared with the identity service (required)
    pub fn from_env() -> Result<Self, String> {
        let secret = env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET environment variable not set".to_string())?;
        Ok(Self::new(&secret))
    }

    pub fn new(secret: &str) -> Self {
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            decoding_key,
            validation,
        }
    }

    /// Validate a token's signature and expiry and return the claims
    pub fn validate(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }
}

/// Authenticated caller, resolved against the users table
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub id_number: Option<String>,
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)?;

    let claims = state
        .token_verifier
        .validate(token)
        .map_err(|_| ApiError::Unauthorized)?;

    // The token subject must still exist and be active
    let user = state
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !user.is_active {
        return Err(ApiError::Unauthorized);
    }

    req.extensions_mut().insert(AuthUser {
        id: user.id,
        email: user.email,
        name: user.name,
        role: user.role,
        phone: user.phone,
        id_number: user.id_number,
    });

    Ok(next.run(req).await)
}

/// Exact set-membership role check
pub fn require_role(user: &AuthUser, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "You do not have permission to perform this action".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_role(role: Role) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: "someone@example.com".to_string(),
            name: "Someone".to_string(),
            role,
            phone: None,
            id_number: None,
        }
    }

    #[test]
    fn test_require_role_accepts_listed_roles() {
        let admin = user_with_role(Role::Admin);
        let editor = user_with_role(Role::Editor);
        assert!(require_role(&admin, &[Role::Admin]).is_ok());
        assert!(require_role(&editor, &[Role::Admin, Role::Editor]).is_ok());
    }

    #[test]
    fn test_require_role_is_not_hierarchical() {
        // Admin is not implicitly accepted where only editor is listed
        let admin = user_with_role(Role::Admin);
        assert!(require_role(&admin, &[Role::Editor]).is_err());

        let editor = user_with_role(Role::Editor);
        assert!(require_role(&editor, &[Role::Admin]).is_err());
    }

    #[test]
    fn test_verifier_round_trip_with_identity_claims() {
        use jsonwebtoken::{EncodingKey, Header, encode};
        use std::time::{SystemTime, UNIX_EPOCH};

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "someone@example.com".to_string(),
            role: Role::Editor,
            iat: now,
            exp: now + 900,
        };
        let token = encode(
            &Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"shared-secret"),
        )
        .unwrap();

        let verifier = TokenVerifier::new("shared-secret");
        let decoded = verifier.validate(&token).unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.role, Role::Editor);

        let other = TokenVerifier::new("different-secret");
        assert!(other.validate(&token).is_err());
    }
}
