//! Audit log routes

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    error::ApiResult,
    middleware::{AuthUser, require_role},
    models::Role,
    state::AppState,
};

/// Pagination query for the audit log
#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// List audit entries newest-first (admin)
pub async fn list_audit_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<AuditQuery>,
) -> ApiResult<impl IntoResponse> {
    require_role(&user, &[Role::Admin])?;

    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    let entries = state.audit.list(limit, offset).await?;
    Ok(Json(entries))
}
