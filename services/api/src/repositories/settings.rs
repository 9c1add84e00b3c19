//! Site settings repository
//!
//! The settings table holds exactly one row, enforced by its primary key.

use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use crate::models::settings::{SiteSettings, UpdateSettingsRequest};

fn settings_from_row(row: &PgRow) -> Result<SiteSettings, sqlx::Error> {
    Ok(SiteSettings {
        site_title: row.try_get("site_title")?,
        contact_email: row.try_get("contact_email")?,
        contact_phone: row.try_get("contact_phone")?,
        homepage_html: row.try_get("homepage_html")?,
        ticket_notice: row.try_get("ticket_notice")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Settings repository
#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    /// Create a new settings repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the settings singleton
    pub async fn get(&self) -> Result<SiteSettings, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT site_title, contact_email, contact_phone, homepage_html, ticket_notice, updated_at
            FROM site_settings
            WHERE id = 1
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        settings_from_row(&row)
    }

    /// Update the settings singleton; omitted fields are left unchanged
    pub async fn update(&self, req: &UpdateSettingsRequest) -> Result<SiteSettings, sqlx::Error> {
        info!("Updating site settings");

        let row = sqlx::query(
            r#"
            UPDATE site_settings
            SET site_title = COALESCE($1, site_title),
                contact_email = COALESCE($2, contact_email),
                contact_phone = COALESCE($3, contact_phone),
                homepage_html = COALESCE($4, homepage_html),
                ticket_notice = COALESCE($5, ticket_notice),
                updated_at = now()
            WHERE id = 1
            RETURNING site_title, contact_email, contact_phone, homepage_html, ticket_notice, updated_at
            "#,
        )
        .bind(&req.site_title)
        .bind(&req.contact_email)
        .bind(&req.contact_phone)
        .bind(&req.homepage_html)
        .bind(&req.ticket_notice)
        .fetch_one(&self.pool)
        .await?;

        settings_from_row(&row)
    }
}
