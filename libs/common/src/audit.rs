//! Append-only audit log
//!
//! Every admin mutation and every login/logout is recorded here. Writes are
//! best-effort: a failed insert is logged and never fails the primary
//! mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};
use tracing::{info, warn};
use uuid::Uuid;

/// The kind of action an audit entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Login,
    Logout,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
            AuditAction::Login => "login",
            AuditAction::Logout => "logout",
        }
    }
}

/// One immutable audit record
#[derive(Debug, Clone, Serialize)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub actor_user_id: Uuid,
    pub actor_email: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for appending an audit record
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub actor_user_id: Uuid,
    pub actor_email: String,
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub summary: Option<String>,
}

/// Audit log writer and reader
#[derive(Clone)]
pub struct AuditRecorder {
    pool: PgPool,
}

impl AuditRecorder {
    /// Create a new audit recorder
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one audit entry
    ///
    /// Awaited inline by callers, but failures only produce a warning so the
    /// primary mutation is never rolled back by a broken audit trail.
    pub async fn record(&self, entry: NewAuditEntry) {
        let result = sqlx::query(
            r#"
            INSERT INTO audit_log (actor_user_id, actor_email, action, entity_type, entity_id, summary)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.actor_user_id)
        .bind(&entry.actor_email)
        .bind(entry.action.as_str())
        .bind(&entry.entity_type)
        .bind(&entry.entity_id)
        .bind(&entry.summary)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                info!(
                    actor = %entry.actor_email,
                    action = entry.action.as_str(),
                    entity = %entry.entity_type,
                    "Audit entry recorded"
                );
            }
            Err(e) => {
                warn!(
                    actor = %entry.actor_email,
                    action = entry.action.as_str(),
                    entity = %entry.entity_type,
                    "Failed to record audit entry: {}",
                    e
                );
            }
        }
    }

    /// List audit entries, newest first
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<AuditLogEntry>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, actor_user_id, actor_email, action, entity_type, entity_id, summary, created_at
            FROM audit_log
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let entries = rows
            .into_iter()
            .map(|row| AuditLogEntry {
                id: row.get("id"),
                actor_user_id: row.get("actor_user_id"),
                actor_email: row.get("actor_email"),
                action: row.get("action"),
                entity_type: row.get("entity_type"),
                entity_id: row.get("entity_id"),
                summary: row.get("summary"),
                created_at: row.get("created_at"),
            })
            .collect();

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_as_str() {
        assert_eq!(AuditAction::Create.as_str(), "create");
        assert_eq!(AuditAction::Update.as_str(), "update");
        assert_eq!(AuditAction::Delete.as_str(), "delete");
        assert_eq!(AuditAction::Login.as_str(), "login");
        assert_eq!(AuditAction::Logout.as_str(), "logout");
    }

    #[test]
    fn test_action_serializes_lowercase() {
        let json = serde_json::to_string(&AuditAction::Logout).unwrap();
        assert_eq!(json, "\"logout\"");
    }
}
