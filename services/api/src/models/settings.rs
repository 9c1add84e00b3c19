//! Site settings singleton

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The one site-settings record
#[derive(Debug, Clone, Serialize)]
pub struct SiteSettings {
    pub site_title: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub homepage_html: Option<String>,
    pub ticket_notice: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Request for settings update; omitted fields are left unchanged
#[derive(Debug, Deserialize, Default)]
pub struct UpdateSettingsRequest {
    pub site_title: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub homepage_html: Option<String>,
    pub ticket_notice: Option<String>,
}
