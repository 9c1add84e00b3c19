//! Admin user-management routes

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use common::audit::{AuditAction, NewAuditEntry};
use common::error::is_unique_violation;

use crate::{
    error::{ApiError, ApiResult},
    middleware::{AuthUser, require_role},
    models::Role,
    models::user::{CreateUserRequest, UpdateUserRequest, UserResponse},
    state::AppState,
    validation::{validate_email, validate_password},
};

/// List every user (admin)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    require_role(&user, &[Role::Admin])?;

    let users = state.users.list().await?;
    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(users))
}

/// Create a user with an explicit role (admin)
pub async fn create_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(mut payload): Json<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    require_role(&user, &[Role::Admin])?;

    let mut details = Vec::new();
    if payload.name.trim().is_empty() {
        details.push("Name is required".to_string());
    }
    if let Err(e) = validate_email(&payload.email) {
        details.push(e);
    }
    if let Err(e) = validate_password(&payload.password) {
        details.push(e);
    }
    if !details.is_empty() {
        return Err(ApiError::ValidationMany(details));
    }

    payload.email = payload.email.trim().to_lowercase();

    let created = match state.users.create(&payload).await {
        Ok(created) => created,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::Conflict(
                "Email is already registered".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    state
        .audit
        .record(NewAuditEntry {
            actor_user_id: user.id,
            actor_email: user.email.clone(),
            action: AuditAction::Create,
            entity_type: "user".to_string(),
            entity_id: Some(created.id.to_string()),
            summary: Some(format!("created {} account", created.role)),
        })
        .await;

    Ok((StatusCode::CREATED, Json(UserResponse::from(created))))
}

/// Update a user (admin)
pub async fn update_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    require_role(&user, &[Role::Admin])?;

    let updated = state
        .users
        .update(id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    state
        .audit
        .record(NewAuditEntry {
            actor_user_id: user.id,
            actor_email: user.email.clone(),
            action: AuditAction::Update,
            entity_type: "user".to_string(),
            entity_id: Some(updated.id.to_string()),
            summary: None,
        })
        .await;

    Ok(Json(UserResponse::from(updated)))
}

/// Delete a user (admin); self-deletion is rejected
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    require_role(&user, &[Role::Admin])?;

    if id == user.id {
        return Err(ApiError::Validation(
            "You cannot delete your own account".to_string(),
        ));
    }

    let deleted = state.users.delete(id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    state
        .audit
        .record(NewAuditEntry {
            actor_user_id: user.id,
            actor_email: user.email.clone(),
            action: AuditAction::Delete,
            entity_type: "user".to_string(),
            entity_id: Some(id.to_string()),
            summary: None,
        })
        .await;

    Ok(Json(serde_json::json!({"message": "User deleted"})))
}
