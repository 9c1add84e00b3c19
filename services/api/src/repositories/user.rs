//! User repository for database operations
//!
//! Reads the users table written by the identity service; also backs the
//! admin user-management surface.

use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::Role;
use crate::models::user::{CreateUserRequest, UpdateUserRequest, User};

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

    /// List all users, newest first
    pub async fn list(&self) -> Result<Vec<User>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, role, is_active, phone, id_number, created_at, updated_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(user_from_row).collect()
    }

    /// Create a user with an explicit role, hashing the supplied password
    ///
    /// A duplicate email surfaces as a unique-constraint violation for the
    /// caller to map to a conflict response.
    pub async fn create(&self, req: &CreateUserRequest) -> Result<User, sqlx::Error> {
        info!("Creating user: {}", req.email);

        let password_hash = common::password::hash_password(&req.password)
            .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;

        let row = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, role, is_active, phone, id_number, created_at, updated_at
            "#,
        )
        .bind(&req.name)
        .bind(&req.email)
        .bind(&password_hash)
        .bind(req.role.as_str())
        .fetch_one(&self.pool)
        .await?;

        user_from_row(&row)
    }

    /// Update a user; omitted fields are left unchanged
    pub async fn update(
        &self,
        id: Uuid,
        req: &UpdateUserRequest,
    ) -> Result<Option<User>, sqlx::Error> {
        info!("Updating user: {}", id);

        let row = sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                role = COALESCE($3, role),
                is_active = COALESCE($4, is_active),
                phone = COALESCE($5, phone),
                id_number = COALESCE($6, id_number),
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, email, password_hash, role, is_active, phone, id_number, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(req.role.map(|r| r.as_str()))
        .bind(req.is_active)
        .bind(&req.phone)
        .bind(&req.id_number)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Delete a user, returning whether they existed
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        info!("Deleting user: {}", id);

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
