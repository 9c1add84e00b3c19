//! FAQ routes

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use common::audit::{AuditAction, NewAuditEntry};

use crate::{
    error::{ApiError, ApiResult},
    middleware::{AuthUser, require_role},
    models::Role,
    models::faq::{CreateFaqRequest, UpdateFaqRequest},
    state::AppState,
};

/// List published FAQ items by position (public)
pub async fn list_faq(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let items = state.faq.list_published().await?;
    Ok(Json(items))
}

/// List every FAQ item, unpublished included
pub async fn admin_list_faq(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Editor])?;
    let items = state.faq.list_all().await?;
    Ok(Json(items))
}

/// Create a FAQ item
pub async fn create_faq(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateFaqRequest>,
) -> ApiResult<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Editor])?;

    if payload.question.trim().is_empty() || payload.answer.trim().is_empty() {
        return Err(ApiError::Validation(
            "Question and answer are required".to_string(),
        ));
    }

    let item = state.faq.create(&payload).await?;

    state
        .audit
        .record(NewAuditEntry {
            actor_user_id: user.id,
            actor_email: user.email.clone(),
            action: AuditAction::Create,
            entity_type: "faq".to_string(),
            entity_id: Some(item.id.to_string()),
            summary: None,
        })
        .await;

    Ok((StatusCode::CREATED, Json(item)))
}

/// Update a FAQ item
pub async fn update_faq(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFaqRequest>,
) -> ApiResult<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Editor])?;

    let item = state
        .faq
        .update(id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("FAQ item not found".to_string()))?;

    state
        .audit
        .record(NewAuditEntry {
            actor_user_id: user.id,
            actor_email: user.email.clone(),
            action: AuditAction::Update,
            entity_type: "faq".to_string(),
            entity_id: Some(item.id.to_string()),
            summary: None,
        })
        .await;

    Ok(Json(item))
}

/// Delete a FAQ item
pub async fn delete_faq(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Editor])?;

    let deleted = state.faq.delete(id).await?;
    if !deleted {
        return Err(ApiError::NotFound("FAQ item not found".to_string()));
    }

    state
        .audit
        .record(NewAuditEntry {
            actor_user_id: user.id,
            actor_email: user.email.clone(),
            action: AuditAction::Delete,
            entity_type: "faq".to_string(),
            entity_id: Some(id.to_string()),
            summary: None,
        })
        .await;

    Ok(Json(serde_json::json!({"message": "FAQ item deleted"})))
}
