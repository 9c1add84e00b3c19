//! Page routes

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
    models::page::{CreatePageRequest, UpdatePageRequest},
    state::AppState,
    validation::validate_slug,
};

/// Fetch a published page by slug (public)
pub async fn get_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let page = state
        .pages
        .find_published_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::NotFound("Page not found".to_string()))?;

    Ok(Json(page))
}

/// List every page, drafts included
pub async fn admin_list_pages(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Editor])?;
    let pages = state.pages.list_all().await?;
    Ok(Json(pages))
}

/// Create a page
pub async fn create_page(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreatePageRequest>,
) -> ApiResult<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Editor])?;

    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }
    validate_slug(&payload.slug).map_err(ApiError::Validation)?;

    let page = match state.pages.create(&payload).await {
        Ok(page) => page,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::Conflict(
                "A page with this slug already exists".to_string(),
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
            entity_type: "page".to_string(),
            entity_id: Some(page.id.to_string()),
            summary: Some(format!("created page '{}'", page.slug)),
        })
        .await;

    Ok((StatusCode::CREATED, Json(page)))
}

/// Update a page
pub async fn update_page(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePageRequest>,
) -> ApiResult<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Editor])?;

    let page = state
        .pages
        .update(id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Page not found".to_string()))?;

    state
        .audit
        .record(NewAuditEntry {
            actor_user_id: user.id,
            actor_email: user.email.clone(),
            action: AuditAction::Update,
            entity_type: "page".to_string(),
            entity_id: Some(page.id.to_string()),
            summary: Some(format!("updated page '{}'", page.slug)),
        })
        .await;

    Ok(Json(page))
}

/// Delete a page
pub async fn delete_page(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Editor])?;

    let deleted = state.pages.delete(id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Page not found".to_string()));
    }

    state
        .audit
        .record(NewAuditEntry {
            actor_user_id: user.id,
            actor_email: user.email.clone(),
            action: AuditAction::Delete,
            entity_type: "page".to_string(),
            entity_id: Some(id.to_string()),
            summary: None,
        })
        .await;

    Ok(Json(serde_json::json!({"message": "Page deleted"})))
}
