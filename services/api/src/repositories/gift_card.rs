//! Gift card repository for database operations
//!
//! Balance decrements happen in a single guarded UPDATE, so two
//! concurrent redemptions can never overdraw a card.

use rust_decimal::Decimal;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::gift_card::GiftCard;

/// Outcome of a balance reservation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// The amount was deducted from the card
    Reserved,
    /// No active card exists with that code
    NotFound,
    /// The card exists but its balance does not cover the amount
    Insufficient,
}

fn gift_card_from_row(row: &PgRow) -> Result<GiftCard, sqlx::Error> {
    Ok(GiftCard {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        initial_amount: row.try_get("initial_amount")?,
        balance: row.try_get("balance")?,
        active: row.try_get("active")?,
        note: row.try_get("note")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Gift card repository
#[derive(Clone)]
pub struct GiftCardRepository {
    pool: PgPool,
}

impl GiftCardRepository {
    /// Create a new gift card repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new gift card
    ///
    /// A duplicate code surfaces as a unique-constraint violation for the
    /// caller to map to a conflict response.
    pub async fn create(
        &self,
        code: &str,
        amount: Decimal,
        note: Option<&str>,
    ) -> Result<GiftCard, sqlx::Error> {
        info!("Creating gift card: {}", code);

        let row = sqlx::query(
            r#"
            INSERT INTO gift_cards (code, initial_amount, balance, note)
            VALUES ($1, $2, $2, $3)
            RETURNING id, code, initial_amount, balance, active, note, created_at, updated_at
            "#,
        )
        .bind(code)
        .bind(amount)
        .bind(note)
        .fetch_one(&self.pool)
        .await?;

        gift_card_from_row(&row)
    }

    /// List all gift cards, newest first
    pub async fn list(&self) -> Result<Vec<GiftCard>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, code, initial_amount, balance, active, note, created_at, updated_at
            FROM gift_cards
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(gift_card_from_row).collect()
    }

    /// Get the balance of an active card
    pub async fn get_balance(&self, code: &str) -> Result<Option<Decimal>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT balance
            FROM gift_cards
            WHERE code = $1 AND active
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.get("balance")))
    }

    /// Reserve an amount against a card's balance
    pub async fn reserve(
        &self,
        code: &str,
        amount: Decimal,
    ) -> Result<ReserveOutcome, sqlx::Error> {
        let row = sqlx::query(
            r#"
            UPDATE gift_cards
            SET balance = balance - $2, updated_at = now()
            WHERE code = $1 AND active AND balance >= $2
            RETURNING balance
            "#,
        )
        .bind(code)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await?;

        if row.is_some() {
            info!("Reserved {} from gift card {}", amount, code);
            return Ok(ReserveOutcome::Reserved);
        }

        let exists = sqlx::query("SELECT 1 FROM gift_cards WHERE code = $1 AND active")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(if exists.is_some() {
            ReserveOutcome::Insufficient
        } else {
            ReserveOutcome::NotFound
        })
    }

    /// Deactivate a card
    pub async fn deactivate(&self, id: Uuid) -> Result<Option<GiftCard>, sqlx::Error> {
        info!("Deactivating gift card: {}", id);

        let row = sqlx::query(
            r#"
            UPDATE gift_cards
            SET active = FALSE, updated_at = now()
            WHERE id = $1
            RETURNING id, code, initial_amount, balance, active, note, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(gift_card_from_row).transpose()
    }
}
