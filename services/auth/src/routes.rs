//! Identity service routes

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use common::audit::{AuditAction, NewAuditEntry};
use common::error::is_unique_violation;

use crate::{
    AppState,
    error::AuthError,
    middleware::{AuthenticatedUser, auth_middleware},
    models::{NewUser, Role, UserResponse},
    validation::{validate_email, validate_name, validate_password},
};

/// Request for user registration
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request for user login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for token issuance
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Request carrying a refresh token
#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Request for a password change
#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Create the router for the identity service
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(me))
        .route("/auth/password", post(change_password))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh_token))
        .route("/auth/logout", post(logout))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "stagepass-auth"
    }))
}

/// User registration endpoint
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let mut details = Vec::new();
    if let Err(e) = validate_name(&payload.name) {
        details.push(e);
    }
    if let Err(e) = validate_email(&payload.email) {
        details.push(e);
    }
    if let Err(e) = validate_password(&payload.password) {
        details.push(e);
    }
    if !details.is_empty() {
        return Err(AuthError::ValidationMany(details));
    }

    let new_user = NewUser {
        name: payload.name.trim().to_string(),
        email: payload.email.trim().to_lowercase(),
        password: payload.password,
        role: Role::Editor,
    };

    let user = match state.user_repository.create(&new_user).await {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => {
            return Err(AuthError::Conflict("Email is already registered".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    info!("Registered user: {}", user.email);

    state
        .audit
        .record(NewAuditEntry {
            actor_user_id: user.id,
            actor_email: user.email.clone(),
            action: AuditAction::Create,
            entity_type: "user".to_string(),
            entity_id: Some(user.id.to_string()),
            summary: Some("account registered".to_string()),
        })
        .await;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let email = payload.email.trim().to_lowercase();
    info!("Login attempt for: {}", email);

    if !state.rate_limiter.is_allowed(&email).await? {
        return Err(AuthError::RateLimited);
    }

    let user = state
        .user_repository
        .find_by_email(&email)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    if !user.is_active {
        return Err(AuthError::Unauthorized);
    }

    if !state.user_repository.verify_password(&user, &payload.password)? {
        return Err(AuthError::Unauthorized);
    }

    let access_token = state.jwt_service.generate_access_token(&user)?;
    let refresh_token = state.refresh_tokens.issue(user.id).await?;

    state
        .audit
        .record(NewAuditEntry {
            actor_user_id: user.id,
            actor_email: user.email.clone(),
            action: AuditAction::Login,
            entity_type: "session".to_string(),
            entity_id: None,
            summary: None,
        })
        .await;

    Ok(Json(TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    }))
}

/// Refresh endpoint: rotates the refresh token and issues a new access token
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Token refresh request");

    let user_id = state
        .refresh_tokens
        .resolve(&payload.refresh_token)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    let user = state
        .user_repository
        .find_by_id(user_id)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    if !user.is_active {
        state.refresh_tokens.revoke(&payload.refresh_token).await?;
        return Err(AuthError::Unauthorized);
    }

    // Rotate: the presented token is retired before a replacement is issued
    state.refresh_tokens.revoke(&payload.refresh_token).await?;
    let refresh_token = state.refresh_tokens.issue(user.id).await?;
    let access_token = state.jwt_service.generate_access_token(&user)?;

    Ok(Json(TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    }))
}

/// Logout endpoint
pub async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Logout request");

    let user_id = state
        .refresh_tokens
        .resolve(&payload.refresh_token)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    state.refresh_tokens.revoke(&payload.refresh_token).await?;

    if let Some(user) = state.user_repository.find_by_id(user_id).await? {
        state
            .audit
            .record(NewAuditEntry {
                actor_user_id: user.id,
                actor_email: user.email,
                action: AuditAction::Logout,
                entity_type: "session".to_string(),
                entity_id: None,
                summary: None,
            })
            .await;
    }

    Ok(Json(serde_json::json!({"message": "Logged out successfully"})))
}

/// Current user profile
pub async fn me(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, AuthError> {
    let user = state
        .user_repository
        .find_by_id(current.id)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    Ok(Json(UserResponse::from(user)))
}

/// Self-service password change
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let user = state
        .user_repository
        .find_by_id(current.id)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    if !state
        .user_repository
        .verify_password(&user, &payload.current_password)?
    {
        return Err(AuthError::Unauthorized);
    }

    validate_password(&payload.new_password).map_err(AuthError::Validation)?;

    state
        .user_repository
        .update_password(user.id, &payload.new_password)
        .await?;

    state
        .audit
        .record(NewAuditEntry {
            actor_user_id: user.id,
            actor_email: user.email,
            action: AuditAction::Update,
            entity_type: "user".to_string(),
            entity_id: Some(user.id.to_string()),
            summary: Some("password changed".to_string()),
        })
        .await;

    Ok(Json(serde_json::json!({"message": "Password updated"})))
}
