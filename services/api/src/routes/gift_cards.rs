//! Gift card routes

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rand::Rng;
use rust_decimal::Decimal;
use uuid::Uuid;

use common::audit::{AuditAction, NewAuditEntry};
use common::error::is_unique_violation;

use crate::{
    error::{ApiError, ApiResult},
    middleware::{AuthUser, require_role},
    models::Role,
    models::gift_card::{CreateGiftCardRequest, GiftCardBalanceResponse},
    state::AppState,
};

/// Generate a random gift card code (16 uppercase hex characters)
fn generate_code() -> String {
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill(&mut bytes);
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

/// Look up the balance of an active card (public)
pub async fn get_balance(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let balance = state
        .gift_cards
        .get_balance(&code)
        .await?
        .ok_or_else(|| ApiError::NotFound("Gift card not found".to_string()))?;

    Ok(Json(GiftCardBalanceResponse { code, balance }))
}

/// List every gift card (admin)
pub async fn list_gift_cards(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    require_role(&user, &[Role::Admin])?;
    let cards = state.gift_cards.list().await?;
    Ok(Json(cards))
}

/// Create a gift card (admin)
pub async fn create_gift_card(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateGiftCardRequest>,
) -> ApiResult<impl IntoResponse> {
    require_role(&user, &[Role::Admin])?;

    if payload.amount <= Decimal::ZERO {
        return Err(ApiError::Validation(
            "Gift card amount must be positive".to_string(),
        ));
    }

    let code = match &payload.code {
        Some(code) => {
            let code = code.trim().to_uppercase();
            if code.is_empty() {
                return Err(ApiError::Validation("Code cannot be empty".to_string()));
            }
            code
        }
        None => generate_code(),
    };

    let card = match state
        .gift_cards
        .create(&code, payload.amount, payload.note.as_deref())
        .await
    {
        Ok(card) => card,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::Conflict(
                "A gift card with this code already exists".to_string(),
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
            entity_type: "gift_card".to_string(),
            entity_id: Some(card.id.to_string()),
            summary: Some(format!("created gift card worth {}", card.initial_amount)),
        })
        .await;

    Ok((StatusCode::CREATED, Json(card)))
}

/// Deactivate a gift card (admin)
pub async fn deactivate_gift_card(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    require_role(&user, &[Role::Admin])?;

    let card = state
        .gift_cards
        .deactivate(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Gift card not found".to_string()))?;

    state
        .audit
        .record(NewAuditEntry {
            actor_user_id: user.id,
            actor_email: user.email.clone(),
            action: AuditAction::Update,
            entity_type: "gift_card".to_string(),
            entity_id: Some(card.id.to_string()),
            summary: Some("deactivated gift card".to_string()),
        })
        .await;

    Ok(Json(card))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_shape() {
        let code = generate_code();
        assert_eq!(code.len(), 16);
        assert!(code.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }
}
