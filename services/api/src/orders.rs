//! Order workflow
//!
//! The path from a ticket request to a persisted order: validate the
//! lines, price them against the show's tier list, apply a gift card,
//! allocate a unique order number, and insert. Reads and cancellation
//! enforce the owner-or-admin rule.

use rand::Rng;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::order::{
    CreateOrderRequest, NewOrderRecord, Order, OrderStatus, OrderTicket, PaymentStatus,
    TicketLineRequest,
};
use crate::models::show::TicketTier;
use crate::repositories::gift_card::ReserveOutcome;
use crate::repositories::order::ORDER_NUMBER_CONSTRAINT;
use crate::repositories::{GiftCardRepository, OrderRepository, ShowRepository};
use common::error::is_unique_violation_on;

/// Bound on order-number allocation attempts before giving up
const MAX_ORDER_NUMBER_ATTEMPTS: u32 = 5;

/// Generate a candidate order number: the last 8 digits of the current
/// millisecond timestamp followed by a 4-digit random suffix
pub(crate) fn generate_order_number() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("{:08}{:04}", millis % 100_000_000, suffix)
}

/// Validate the shape of an order request before touching the database
pub(crate) fn validate_request(req: &CreateOrderRequest) -> Result<(), ApiError> {
    if req.tickets.is_empty() {
        return Err(ApiError::Validation(
            "Order must contain at least one ticket".to_string(),
        ));
    }

    for line in &req.tickets {
        if line.quantity < 1 {
            return Err(ApiError::Validation(
                "Ticket quantity must be at least 1".to_string(),
            ));
        }
        if line.tier_price < Decimal::ZERO {
            return Err(ApiError::Validation(
                "Ticket price cannot be negative".to_string(),
            ));
        }
    }

    match (&req.gift_card_code, req.gift_card_amount) {
        (None, None) => {}
        (Some(_), Some(amount)) if amount <= Decimal::ZERO => {
            return Err(ApiError::Validation(
                "Gift card amount must be positive".to_string(),
            ));
        }
        (Some(_), Some(_)) => {}
        _ => {
            return Err(ApiError::Validation(
                "Gift card code and amount must be supplied together".to_string(),
            ));
        }
    }

    Ok(())
}

/// Price the requested lines against the show's tier list
///
/// Unit prices come from the stored tiers, never from the request; a
/// submitted price that disagrees with the tier is rejected so the client
/// learns the price changed instead of being silently repriced.
pub(crate) fn price_tickets(
    tiers: &[TicketTier],
    lines: &[TicketLineRequest],
) -> Result<(Vec<OrderTicket>, Decimal), ApiError> {
    let mut tickets = Vec::with_capacity(lines.len());
    let mut total = Decimal::ZERO;

    for line in lines {
        let tier = tiers
            .iter()
            .find(|t| t.label == line.tier_label)
            .ok_or_else(|| {
                ApiError::Validation(format!("Unknown ticket tier: {}", line.tier_label))
            })?;

        if line.tier_price != tier.price {
            return Err(ApiError::Validation(format!(
                "Price for tier {} does not match the current price list",
                line.tier_label
            )));
        }

        let subtotal = tier.price * Decimal::from(line.quantity);
        total += subtotal;
        tickets.push(OrderTicket {
            tier_label: tier.label.clone(),
            tier_price: tier.price,
            quantity: line.quantity,
            subtotal,
        });
    }

    Ok((tickets, total))
}

/// Total after a gift card: never negative
pub(crate) fn apply_gift_card(tickets_total: Decimal, amount: Decimal) -> Decimal {
    (tickets_total - amount).max(Decimal::ZERO)
}

fn ensure_owner_or_admin(order: &Order, actor: &AuthUser) -> Result<(), ApiError> {
    if order.user_id == actor.id || actor.role.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "This order belongs to another user".to_string(),
        ))
    }
}

/// Order workflow service
#[derive(Clone)]
pub struct OrderService {
    orders: OrderRepository,
    shows: ShowRepository,
    gift_cards: GiftCardRepository,
}

impl OrderService {
    /// Create a new order service
    pub fn new(
        orders: OrderRepository,
        shows: ShowRepository,
        gift_cards: GiftCardRepository,
    ) -> Self {
        Self {
            orders,
            shows,
            gift_cards,
        }
    }

    /// Create an order for the authenticated caller
    pub async fn create(
        &self,
        actor: &AuthUser,
        req: CreateOrderRequest,
    ) -> Result<Order, ApiError> {
        validate_request(&req)?;

        let show = self
            .shows
            .find_by_id(req.show_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Show not found".to_string()))?;

        let (tickets, tickets_total) = price_tickets(&show.ticket_tiers, &req.tickets)?;

        // Reserve the gift card before the insert; the reservation is the
        // only cross-entity write and the balance guard lives in SQL
        let (gift_card_code, gift_card_amount_used, total_amount) =
            match (&req.gift_card_code, req.gift_card_amount) {
                (Some(code), Some(amount)) => {
                    match self.gift_cards.reserve(code, amount).await? {
                        ReserveOutcome::Reserved => {}
                        ReserveOutcome::NotFound => {
                            return Err(ApiError::Payment(
                                "Gift card not found or inactive".to_string(),
                            ));
                        }
                        ReserveOutcome::Insufficient => {
                            return Err(ApiError::Payment(
                                "Insufficient gift card balance".to_string(),
                            ));
                        }
                    }
                    (
                        Some(code.clone()),
                        Some(amount),
                        apply_gift_card(tickets_total, amount),
                    )
                }
                _ => (None, None, tickets_total),
            };

        let mut attempts = 0;
        loop {
            attempts += 1;

            let record = NewOrderRecord {
                order_number: generate_order_number(),
                user_id: actor.id,
                user_email: actor.email.clone(),
                user_name: actor.name.clone(),
                user_phone: req.phone.clone().or_else(|| actor.phone.clone()),
                user_id_number: req.id_number.clone().or_else(|| actor.id_number.clone()),
                show_id: show.id,
                show_title: show.title.clone(),
                show_date: show.date,
                show_venue: show.venue_name.clone(),
                tickets: tickets.clone(),
                total_amount,
                status: OrderStatus::Confirmed,
                payment_status: PaymentStatus::Paid,
                gift_card_code: gift_card_code.clone(),
                gift_card_amount_used,
            };

            match self.orders.insert(&record).await {
                Ok(order) => {
                    info!(
                        order_number = %order.order_number,
                        user = %order.user_email,
                        total = %order.total_amount,
                        "Order created"
                    );
                    return Ok(order);
                }
                Err(e) if is_unique_violation_on(&e, ORDER_NUMBER_CONSTRAINT) => {
                    if attempts >= MAX_ORDER_NUMBER_ATTEMPTS {
                        return Err(ApiError::Conflict(
                            "Could not allocate a unique order number".to_string(),
                        ));
                    }
                    warn!(
                        "Order number collision, retrying ({}/{})",
                        attempts, MAX_ORDER_NUMBER_ATTEMPTS
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Cancel an order
    ///
    /// Cancelling an already-cancelled order is a no-op. Neither the gift
    /// card balance nor any inventory is restored.
    pub async fn cancel(&self, id: Uuid, actor: &AuthUser) -> Result<Order, ApiError> {
        let order = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

        ensure_owner_or_admin(&order, actor)?;

        if order.status == OrderStatus::Cancelled {
            return Ok(order);
        }

        if !order.status.can_transition(OrderStatus::Cancelled) {
            return Err(ApiError::Conflict(format!(
                "Order in status {} cannot be cancelled",
                order.status.as_str()
            )));
        }

        let updated = self
            .orders
            .update_status(order.id, OrderStatus::Cancelled)
            .await?
            .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

        info!(order_number = %updated.order_number, "Order cancelled");
        Ok(updated)
    }

    /// Fetch an order by ID, enforcing ownership
    pub async fn get_by_id(&self, id: Uuid, actor: &AuthUser) -> Result<Order, ApiError> {
        let order = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

        ensure_owner_or_admin(&order, actor)?;
        Ok(order)
    }

    /// Fetch an order by order number, enforcing ownership
    pub async fn get_by_order_number(
        &self,
        order_number: &str,
        actor: &AuthUser,
    ) -> Result<Order, ApiError> {
        let order = self
            .orders
            .find_by_order_number(order_number)
            .await?
            .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

        ensure_owner_or_admin(&order, actor)?;
        Ok(order)
    }

    /// List the caller's orders
    pub async fn list_for_user(&self, actor: &AuthUser) -> Result<Vec<Order>, ApiError> {
        Ok(self.orders.list_by_user(actor.id).await?)
    }

    /// List every order (admin surface)
    pub async fn list_all(&self) -> Result<Vec<Order>, ApiError> {
        Ok(self.orders.list_all().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn tier(label: &str, price: i64) -> TicketTier {
        TicketTier {
            label: label.to_string(),
            price: Decimal::from(price),
            currency: "EUR".to_string(),
        }
    }

    fn line(label: &str, price: i64, quantity: i64) -> TicketLineRequest {
        TicketLineRequest {
            tier_label: label.to_string(),
            tier_price: Decimal::from(price),
            quantity,
        }
    }

    fn request(tickets: Vec<TicketLineRequest>) -> CreateOrderRequest {
        CreateOrderRequest {
            show_id: Uuid::new_v4(),
            tickets,
            phone: None,
            id_number: None,
            gift_card_code: None,
            gift_card_amount: None,
        }
    }

    #[test]
    fn test_empty_ticket_list_is_rejected() {
        let err = validate_request(&request(vec![])).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_zero_quantity_is_rejected() {
        let err = validate_request(&request(vec![line("General", 120, 0)])).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let err = validate_request(&request(vec![line("General", -1, 1)])).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_gift_card_fields_must_pair() {
        let mut req = request(vec![line("General", 120, 1)]);
        req.gift_card_code = Some("CARD123".to_string());
        assert!(matches!(
            validate_request(&req).unwrap_err(),
            ApiError::Validation(_)
        ));

        let mut req = request(vec![line("General", 120, 1)]);
        req.gift_card_amount = Some(Decimal::from(50));
        assert!(matches!(
            validate_request(&req).unwrap_err(),
            ApiError::Validation(_)
        ));

        let mut req = request(vec![line("General", 120, 1)]);
        req.gift_card_code = Some("CARD123".to_string());
        req.gift_card_amount = Some(Decimal::ZERO);
        assert!(matches!(
            validate_request(&req).unwrap_err(),
            ApiError::Validation(_)
        ));
    }

    #[test]
    fn test_pricing_two_general_tickets() {
        let tiers = vec![tier("General", 120), tier("VIP", 250)];
        let (tickets, total) = price_tickets(&tiers, &[line("General", 120, 2)]).unwrap();

        assert_eq!(total, Decimal::from(240));
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].subtotal, Decimal::from(240));
        assert_eq!(tickets[0].quantity, 2);
    }

    #[test]
    fn test_pricing_mixed_tiers() {
        let tiers = vec![tier("General", 120), tier("VIP", 250)];
        let (tickets, total) =
            price_tickets(&tiers, &[line("General", 120, 2), line("VIP", 250, 1)]).unwrap();

        assert_eq!(total, Decimal::from(490));
        assert_eq!(tickets[1].subtotal, Decimal::from(250));
    }

    #[test]
    fn test_unknown_tier_is_rejected() {
        let tiers = vec![tier("General", 120)];
        let err = price_tickets(&tiers, &[line("Balcony", 80, 1)]).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_stale_price_is_rejected() {
        let tiers = vec![tier("General", 150)];
        let err = price_tickets(&tiers, &[line("General", 120, 1)]).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_gift_card_reduces_total() {
        assert_eq!(
            apply_gift_card(Decimal::from(240), Decimal::from(50)),
            Decimal::from(190)
        );
    }

    #[test]
    fn test_gift_card_exceeding_total_clamps_to_zero() {
        assert_eq!(
            apply_gift_card(Decimal::from(240), Decimal::from(300)),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_order_number_shape() {
        let number = generate_order_number();
        assert_eq!(number.len(), 12);
        assert!(number.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_owner_and_admin_pass_ownership_check() {
        let owner_id = Uuid::new_v4();
        let order = sample_order(owner_id);

        let owner = auth_user(owner_id, Role::Editor);
        assert!(ensure_owner_or_admin(&order, &owner).is_ok());

        let admin = auth_user(Uuid::new_v4(), Role::Admin);
        assert!(ensure_owner_or_admin(&order, &admin).is_ok());

        let stranger = auth_user(Uuid::new_v4(), Role::Editor);
        assert!(matches!(
            ensure_owner_or_admin(&order, &stranger).unwrap_err(),
            ApiError::Forbidden(_)
        ));
    }

    fn auth_user(id: Uuid, role: Role) -> AuthUser {
        AuthUser {
            id,
            email: "buyer@example.com".to_string(),
            name: "Buyer".to_string(),
            role,
            phone: None,
            id_number: None,
        }
    }

    fn sample_order(user_id: Uuid) -> Order {
        Order {
            id: Uuid::new_v4(),
            order_number: generate_order_number(),
            user_id,
            user_email: "buyer@example.com".to_string(),
            user_name: "Buyer".to_string(),
            user_phone: None,
            user_id_number: None,
            show_id: Uuid::new_v4(),
            show_title: "Evening Show".to_string(),
            show_date: chrono::Utc::now(),
            show_venue: "Main Hall".to_string(),
            tickets: vec![OrderTicket {
                tier_label: "General".to_string(),
                tier_price: Decimal::from(120),
                quantity: 2,
                subtotal: Decimal::from(240),
            }],
            total_amount: Decimal::from(240),
            status: OrderStatus::Confirmed,
            payment_status: PaymentStatus::Paid,
            gift_card_code: None,
            gift_card_amount_used: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }
}
