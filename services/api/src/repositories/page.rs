//! Page repository for database operations

use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::page::{CreatePageRequest, Page, UpdatePageRequest};

fn page_from_row(row: &PgRow) -> Result<Page, sqlx::Error> {
    Ok(Page {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        title: row.try_get("title")?,
        body: row.try_get("body")?,
        published: row.try_get("published")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Page repository
#[derive(Clone)]
pub struct PageRepository {
    pool: PgPool,
}

impl PageRepository {
    /// Create a new page repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new page
    pub async fn create(&self, req: &CreatePageRequest) -> Result<Page, sqlx::Error> {
        info!("Creating page: {}", req.slug);

        let row = sqlx::query(
            r#"
            INSERT INTO pages (slug, title, body, published)
            VALUES ($1, $2, $3, $4)
            RETURNING id, slug, title, body, published, created_at, updated_at
            "#,
        )
        .bind(&req.slug)
        .bind(&req.title)
        .bind(&req.body)
        .bind(req.published)
        .fetch_one(&self.pool)
        .await?;

        page_from_row(&row)
    }

    /// Update a page; omitted fields are left unchanged
    pub async fn update(
        &self,
        id: Uuid,
        req: &UpdatePageRequest,
    ) -> Result<Option<Page>, sqlx::Error> {
        info!("Updating page: {}", id);

        let row = sqlx::query(
            r#"
            UPDATE pages
            SET title = COALESCE($2, title),
                body = COALESCE($3, body),
                published = COALESCE($4, published),
                updated_at = now()
            WHERE id = $1
            RETURNING id, slug, title, body, published, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&req.title)
        .bind(&req.body)
        .bind(req.published)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(page_from_row).transpose()
    }

    /// Delete a page, returning whether it existed
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        info!("Deleting page: {}", id);

        let result = sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Find a published page by slug
    pub async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Page>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, slug, title, body, published, created_at, updated_at
            FROM pages
            WHERE slug = $1 AND published
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(page_from_row).transpose()
    }

    /// List every page, drafts included
    pub async fn list_all(&self) -> Result<Vec<Page>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, slug, title, body, published, created_at, updated_at
            FROM pages
            ORDER BY slug ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(page_from_row).collect()
    }
}
