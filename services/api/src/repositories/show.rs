//! Show repository for database operations

use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use tracing::info;
use uuid::Uuid;

use crate::models::show::{CreateShowRequest, Show, ShowStatus, TicketTier, UpdateShowRequest};

fn show_from_row(row: &PgRow) -> Result<Show, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<ShowStatus>()
        .map_err(|e| sqlx::Error::Decode(e.into()))?;
    let tiers: Json<Vec<TicketTier>> = row.try_get("ticket_tiers")?;

    Ok(Show {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        date: row.try_get("date")?,
        venue_name: row.try_get("venue_name")?,
        venue_address: row.try_get("venue_address")?,
        description: row.try_get("description")?,
        ticket_tiers: tiers.0,
        published: row.try_get("published")?,
        archived: row.try_get("archived")?,
        status,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Show repository
#[derive(Clone)]
pub struct ShowRepository {
    pool: PgPool,
}

impl ShowRepository {
    /// Create a new show repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new show
    ///
    /// A duplicate slug surfaces as a unique-constraint violation for the
    /// caller to map to a conflict response.
    pub async fn create(&self, req: &CreateShowRequest) -> Result<Show, sqlx::Error> {
        info!("Creating show: {}", req.slug);

        let row = sqlx::query(
            r#"
            INSERT INTO shows (title, slug, date, venue_name, venue_address, description, ticket_tiers, published)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, title, slug, date, venue_name, venue_address, description, ticket_tiers,
                      published, archived, status, created_at, updated_at
            "#,
        )
        .bind(&req.title)
        .bind(&req.slug)
        .bind(req.date)
        .bind(&req.venue_name)
        .bind(&req.venue_address)
        .bind(&req.description)
        .bind(Json(&req.ticket_tiers))
        .bind(req.published)
        .fetch_one(&self.pool)
        .await?;

        show_from_row(&row)
    }

    /// Update a show; omitted fields are left unchanged
    pub async fn update(
        &self,
        id: Uuid,
        req: &UpdateShowRequest,
    ) -> Result<Option<Show>, sqlx::Error> {
        info!("Updating show: {}", id);

        let row = sqlx::query(
            r#"
            UPDATE shows
            SET title = COALESCE($2, title),
                date = COALESCE($3, date),
                venue_name = COALESCE($4, venue_name),
                venue_address = COALESCE($5, venue_address),
                description = COALESCE($6, description),
                ticket_tiers = COALESCE($7, ticket_tiers),
                published = COALESCE($8, published),
                archived = COALESCE($9, archived),
                status = COALESCE($10, status),
                updated_at = now()
            WHERE id = $1
            RETURNING id, title, slug, date, venue_name, venue_address, description, ticket_tiers,
                      published, archived, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&req.title)
        .bind(req.date)
        .bind(&req.venue_name)
        .bind(&req.venue_address)
        .bind(&req.description)
        .bind(req.ticket_tiers.as_ref().map(Json))
        .bind(req.published)
        .bind(req.archived)
        .bind(req.status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(show_from_row).transpose()
    }

    /// Delete a show, returning whether it existed
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        info!("Deleting show: {}", id);

        let result = sqlx::query("DELETE FROM shows WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Find a show by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Show>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, title, slug, date, venue_name, venue_address, description, ticket_tiers,
                   published, archived, status, created_at, updated_at
            FROM shows
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(show_from_row).transpose()
    }

    /// Find a published, unarchived show by slug
    pub async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Show>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, title, slug, date, venue_name, venue_address, description, ticket_tiers,
                   published, archived, status, created_at, updated_at
            FROM shows
            WHERE slug = $1 AND published AND NOT archived
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(show_from_row).transpose()
    }

    /// List published, unarchived shows ordered by date
    pub async fn list_published(&self) -> Result<Vec<Show>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, slug, date, venue_name, venue_address, description, ticket_tiers,
                   published, archived, status, created_at, updated_at
            FROM shows
            WHERE published AND NOT archived
            ORDER BY date ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(show_from_row).collect()
    }

    /// List every show, drafts and archived included
    pub async fn list_all(&self) -> Result<Vec<Show>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, slug, date, venue_name, venue_address, description, ticket_tiers,
                   published, archived, status, created_at, updated_at
            FROM shows
            ORDER BY date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(show_from_row).collect()
    }
}
