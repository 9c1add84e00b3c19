//! Show model and related payloads

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// A named price point for a show (e.g. "General", "VIP")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketTier {
    pub label: String,
    pub price: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "EUR".to_string()
}

/// Availability status shown to the public
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowStatus {
    Available,
    FewLeft,
    SoldOut,
    Closed,
}

impl ShowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShowStatus::Available => "available",
            ShowStatus::FewLeft => "few_left",
            ShowStatus::SoldOut => "sold_out",
            ShowStatus::Closed => "closed",
        }
    }
}

impl FromStr for ShowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(ShowStatus::Available),
            "few_left" => Ok(ShowStatus::FewLeft),
            "sold_out" => Ok(ShowStatus::SoldOut),
            "closed" => Ok(ShowStatus::Closed),
            other => Err(format!("unknown show status: {}", other)),
        }
    }
}

/// Show entity
#[derive(Debug, Clone, Serialize)]
pub struct Show {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub date: DateTime<Utc>,
    pub venue_name: String,
    pub venue_address: String,
    pub description: Option<String>,
    pub ticket_tiers: Vec<TicketTier>,
    pub published: bool,
    pub archived: bool,
    pub status: ShowStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for show creation
#[derive(Debug, Deserialize)]
pub struct CreateShowRequest {
    pub title: String,
    pub slug: String,
    pub date: DateTime<Utc>,
    pub venue_name: String,
    pub venue_address: String,
    pub description: Option<String>,
    #[serde(default)]
    pub ticket_tiers: Vec<TicketTier>,
    #[serde(default)]
    pub published: bool,
}

/// Request for show update; omitted fields are left unchanged
#[derive(Debug, Deserialize, Default)]
pub struct UpdateShowRequest {
    pub title: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub venue_name: Option<String>,
    pub venue_address: Option<String>,
    pub description: Option<String>,
    pub ticket_tiers: Option<Vec<TicketTier>>,
    pub published: Option<bool>,
    pub archived: Option<bool>,
    pub status: Option<ShowStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_status_round_trip() {
        assert_eq!("few_left".parse::<ShowStatus>().unwrap(), ShowStatus::FewLeft);
        assert_eq!(ShowStatus::SoldOut.as_str(), "sold_out");
        assert!("cancelled".parse::<ShowStatus>().is_err());
    }

    #[test]
    fn test_ticket_tier_defaults_currency() {
        let tier: TicketTier =
            serde_json::from_str(r#"{"label": "General", "price": 120}"#).unwrap();
        assert_eq!(tier.currency, "EUR");
        assert_eq!(tier.price, Decimal::from(120));
    }
}
