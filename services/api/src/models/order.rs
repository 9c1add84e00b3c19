//! Order model
//!
//! An order is immutable after creation apart from its status. The show
//! and purchaser display fields are snapshots taken at order time, so
//! later edits to the show or user never change historical orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }

    /// Whether a transition to `next` is legal
    ///
    /// `Refunded` is a defined terminal state with no code path reaching
    /// it yet; the transition from `Confirmed` stays legal.
    pub fn can_transition(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Confirmed)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Confirmed, OrderStatus::Cancelled)
                | (OrderStatus::Confirmed, OrderStatus::Refunded)
        )
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            "refunded" => Ok(OrderStatus::Refunded),
            other => Err(format!("unknown order status: {}", other)),
        }
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "failed" => Ok(PaymentStatus::Failed),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(format!("unknown payment status: {}", other)),
        }
    }
}

/// One priced line of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTicket {
    pub tier_label: String,
    pub tier_price: Decimal,
    pub quantity: i64,
    pub subtotal: Decimal,
}

/// Order entity
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub user_email: String,
    pub user_name: String,
    pub user_phone: Option<String>,
    pub user_id_number: Option<String>,
    pub show_id: Uuid,
    pub show_title: String,
    pub show_date: DateTime<Utc>,
    pub show_venue: String,
    pub tickets: Vec<OrderTicket>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub gift_card_code: Option<String>,
    pub gift_card_amount_used: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One requested ticket line
#[derive(Debug, Clone, Deserialize)]
pub struct TicketLineRequest {
    pub tier_label: String,
    pub tier_price: Decimal,
    pub quantity: i64,
}

/// Request for order creation
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub show_id: Uuid,
    pub tickets: Vec<TicketLineRequest>,
    pub phone: Option<String>,
    pub id_number: Option<String>,
    pub gift_card_code: Option<String>,
    pub gift_card_amount: Option<Decimal>,
}

/// Fully assembled order row, ready for insertion
#[derive(Debug, Clone)]
pub struct NewOrderRecord {
    pub order_number: String,
    pub user_id: Uuid,
    pub user_email: String,
    pub user_name: String,
    pub user_phone: Option<String>,
    pub user_id_number: Option<String>,
    pub show_id: Uuid,
    pub show_title: String,
    pub show_date: DateTime<Utc>,
    pub show_venue: String,
    pub tickets: Vec<OrderTicket>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub gift_card_code: Option<String>,
    pub gift_card_amount_used: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_transitions() {
        assert!(OrderStatus::Pending.can_transition(OrderStatus::Confirmed));
        assert!(OrderStatus::Pending.can_transition(OrderStatus::Cancelled));
        assert!(OrderStatus::Confirmed.can_transition(OrderStatus::Cancelled));
        assert!(OrderStatus::Confirmed.can_transition(OrderStatus::Refunded));
    }

    #[test]
    fn test_cancelled_is_terminal() {
        assert!(!OrderStatus::Cancelled.can_transition(OrderStatus::Pending));
        assert!(!OrderStatus::Cancelled.can_transition(OrderStatus::Confirmed));
        assert!(!OrderStatus::Cancelled.can_transition(OrderStatus::Refunded));
    }

    #[test]
    fn test_refunded_is_terminal() {
        assert!(!OrderStatus::Refunded.can_transition(OrderStatus::Confirmed));
        assert!(!OrderStatus::Refunded.can_transition(OrderStatus::Cancelled));
    }

    #[test]
    fn test_pending_cannot_skip_to_refunded() {
        assert!(!OrderStatus::Pending.can_transition(OrderStatus::Refunded));
    }

    #[test]
    fn test_status_round_trip() {
        assert_eq!("confirmed".parse::<OrderStatus>().unwrap(), OrderStatus::Confirmed);
        assert_eq!(OrderStatus::Cancelled.as_str(), "cancelled");
        assert!("shipped".parse::<OrderStatus>().is_err());
        assert_eq!("paid".parse::<PaymentStatus>().unwrap(), PaymentStatus::Paid);
    }
}
