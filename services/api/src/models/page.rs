//! Static page model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Page entity
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub body: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for page creation
#[derive(Debug, Deserialize)]
pub struct CreatePageRequest {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub published: bool,
}

/// Request for page update; omitted fields are left unchanged
#[derive(Debug, Deserialize, Default)]
pub struct UpdatePageRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub published: Option<bool>,
}
