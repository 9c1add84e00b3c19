//! User repository for database operations

use anyhow::Result;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::{NewUser, Role, User};

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    let role: String = row.try_get("role")?;
    let role = role
        .parse::<Role>()
        .map_err(|e| sqlx::Error::Decode(e.into()))?;

    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role,
        is_active: row.try_get("is_active")?,
        phone: row.try_get("phone")?,
        id_number: row.try_get("id_number")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user, hashing the supplied password
    ///
    /// A duplicate email surfaces as a unique-constraint violation for the
    /// caller to map to a conflict response.
    pub async fn create(&self, new_user: &NewUser) -> Result<User, sqlx::Error> {
        info!("Creating new user: {}", new_user.email);

        let password_hash = common::password::hash_password(&new_user.password)
            .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;

        let row = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, role, is_active, phone, id_number, created_at, updated_at
            "#,
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&password_hash)
        .bind(new_user.role.as_str())
        .fetch_one(&self.pool)
        .await?;

        user_from_row(&row)
    }

    /// Find a user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, role, is_active, phone, id_number, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, role, is_active, phone, id_number, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Replace a user's password hash
    pub async fn update_password(&self, id: Uuid, password: &str) -> Result<(), sqlx::Error> {
        info!("Updating password for user: {}", id);

        let password_hash = common::password::hash_password(password)
            .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;

        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&password_hash)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Verify a user's password
    pub fn verify_password(&self, user: &User, password: &str) -> Result<bool> {
        common::password::verify_password(password, &user.password_hash)
    }
}
