//! Gift card model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Gift card entity
#[derive(Debug, Clone, Serialize)]
pub struct GiftCard {
    pub id: Uuid,
    pub code: String,
    pub initial_amount: Decimal,
    pub balance: Decimal,
    pub active: bool,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for gift card creation
#[derive(Debug, Deserialize)]
pub struct CreateGiftCardRequest {
    pub amount: Decimal,
    /// Explicit code; a random one is generated when omitted
    pub code: Option<String>,
    pub note: Option<String>,
}

/// Public balance view
#[derive(Debug, Serialize)]
pub struct GiftCardBalanceResponse {
    pub code: String,
    pub balance: Decimal,
}
