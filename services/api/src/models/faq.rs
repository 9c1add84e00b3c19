//! FAQ item model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// FAQ entry, listed by ascending position
#[derive(Debug, Clone, Serialize)]
pub struct FaqItem {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub position: i32,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for FAQ creation
#[derive(Debug, Deserialize)]
pub struct CreateFaqRequest {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default = "default_published")]
    pub published: bool,
}

fn default_published() -> bool {
    true
}

/// Request for FAQ update; omitted fields are left unchanged
#[derive(Debug, Deserialize, Default)]
pub struct UpdateFaqRequest {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub position: Option<i32>,
    pub published: Option<bool>,
}
