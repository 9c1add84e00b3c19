//! Site settings routes

use axum::{Extension, Json, extract::State, response::IntoResponse};

use common::audit::{AuditAction, NewAuditEntry};

use crate::{
    error::ApiResult,
    middleware::{AuthUser, require_role},
    models::Role,
    models::settings::UpdateSettingsRequest,
    state::AppState,
};

/// Read the site settings through the cache (public)
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let repo = state.settings.clone();
    let settings = state
        .settings_cache
        .get(|| async move { repo.get().await })
        .await?;

    Ok(Json(settings))
}

/// Update the site settings and invalidate the cache
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> ApiResult<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Editor])?;

    let settings = state.settings.update(&payload).await?;
    state.settings_cache.invalidate().await;

    state
        .audit
        .record(NewAuditEntry {
            actor_user_id: user.id,
            actor_email: user.email.clone(),
            action: AuditAction::Update,
            entity_type: "settings".to_string(),
            entity_id: None,
            summary: Some("updated site settings".to_string()),
        })
        .await;

    Ok(Json(settings))
}
