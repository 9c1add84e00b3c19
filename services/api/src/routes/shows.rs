//! Show routes

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use common::audit::{AuditAction, NewAuditEntry};
use common::error::is_unique_violation;

use crate::{
    error::{ApiError, ApiResult},
    middleware::{AuthUser, require_role},
    models::Role,
    models::show::{CreateShowRequest, TicketTier, UpdateShowRequest},
    state::AppState,
    validation::validate_slug,
};

fn validate_tiers(tiers: &[TicketTier]) -> Result<(), ApiError> {
    for tier in tiers {
        if tier.label.trim().is_empty() {
            return Err(ApiError::Validation(
                "Ticket tier label is required".to_string(),
            ));
        }
        if tier.price < Decimal::ZERO {
            return Err(ApiError::Validation(
                "Ticket tier price cannot be negative".to_string(),
            ));
        }
    }
    Ok(())
}

/// List published shows by date (public)
pub async fn list_shows(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let shows = state.shows.list_published().await?;
    Ok(Json(shows))
}

/// Fetch a published show by slug (public)
pub async fn get_show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let show = state
        .shows
        .find_published_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::NotFound("Show not found".to_string()))?;

    Ok(Json(show))
}

/// List every show, drafts included
pub async fn admin_list_shows(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Editor])?;
    let shows = state.shows.list_all().await?;
    Ok(Json(shows))
}

/// Create a show
pub async fn create_show(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateShowRequest>,
) -> ApiResult<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Editor])?;

    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }
    validate_slug(&payload.slug).map_err(ApiError::Validation)?;
    validate_tiers(&payload.ticket_tiers)?;

    let show = match state.shows.create(&payload).await {
        Ok(show) => show,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::Conflict(
                "A show with this slug already exists".to_string(),
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
            entity_type: "show".to_string(),
            entity_id: Some(show.id.to_string()),
            summary: Some(format!("created show '{}'", show.slug)),
        })
        .await;

    Ok((StatusCode::CREATED, Json(show)))
}

/// Update a show
pub async fn update_show(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateShowRequest>,
) -> ApiResult<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Editor])?;

    if let Some(tiers) = &payload.ticket_tiers {
        validate_tiers(tiers)?;
    }

    let show = state
        .shows
        .update(id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Show not found".to_string()))?;

    state
        .audit
        .record(NewAuditEntry {
            actor_user_id: user.id,
            actor_email: user.email.clone(),
            action: AuditAction::Update,
            entity_type: "show".to_string(),
            entity_id: Some(show.id.to_string()),
            summary: Some(format!("updated show '{}'", show.slug)),
        })
        .await;

    Ok(Json(show))
}

/// Delete a show
pub async fn delete_show(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Editor])?;

    let deleted = state.shows.delete(id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Show not found".to_string()));
    }

    state
        .audit
        .record(NewAuditEntry {
            actor_user_id: user.id,
            actor_email: user.email.clone(),
            action: AuditAction::Delete,
            entity_type: "show".to_string(),
            entity_id: Some(id.to_string()),
            summary: None,
        })
        .await;

    Ok(Json(serde_json::json!({"message": "Show deleted"})))
}
