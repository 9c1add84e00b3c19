//! FAQ repository for database operations

use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::faq::{CreateFaqRequest, FaqItem, UpdateFaqRequest};

fn faq_from_row(row: &PgRow) -> Result<FaqItem, sqlx::Error> {
    Ok(FaqItem {
        id: row.try_get("id")?,
        question: row.try_get("question")?,
        answer: row.try_get("answer")?,
        position: row.try_get("position")?,
        published: row.try_get("published")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// FAQ repository
#[derive(Clone)]
pub struct FaqRepository {
    pool: PgPool,
}

impl FaqRepository {
    /// Create a new FAQ repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new FAQ item
    pub async fn create(&self, req: &CreateFaqRequest) -> Result<FaqItem, sqlx::Error> {
        info!("Creating FAQ item");

        let row = sqlx::query(
            r#"
            INSERT INTO faq_items (question, answer, position, published)
            VALUES ($1, $2, $3, $4)
            RETURNING id, question, answer, position, published, created_at, updated_at
            "#,
        )
        .bind(&req.question)
        .bind(&req.answer)
        .bind(req.position)
        .bind(req.published)
        .fetch_one(&self.pool)
        .await?;

        faq_from_row(&row)
    }

    /// Update a FAQ item; omitted fields are left unchanged
    pub async fn update(
        &self,
        id: Uuid,
        req: &UpdateFaqRequest,
    ) -> Result<Option<FaqItem>, sqlx::Error> {
        info!("Updating FAQ item: {}", id);

        let row = sqlx::query(
            r#"
            UPDATE faq_items
            SET question = COALESCE($2, question),
                answer = COALESCE($3, answer),
                position = COALESCE($4, position),
                published = COALESCE($5, published),
                updated_at = now()
            WHERE id = $1
            RETURNING id, question, answer, position, published, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&req.question)
        .bind(&req.answer)
        .bind(req.position)
        .bind(req.published)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(faq_from_row).transpose()
    }

    /// Delete a FAQ item, returning whether it existed
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        info!("Deleting FAQ item: {}", id);

        let result = sqlx::query("DELETE FROM faq_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List published items by ascending position
    pub async fn list_published(&self) -> Result<Vec<FaqItem>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, question, answer, position, published, created_at, updated_at
            FROM faq_items
            WHERE published
            ORDER BY position ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(faq_from_row).collect()
    }

    /// List every item, unpublished included
    pub async fn list_all(&self) -> Result<Vec<FaqItem>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, question, answer, position, published, created_at, updated_at
            FROM faq_items
            ORDER BY position ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(faq_from_row).collect()
    }
}
