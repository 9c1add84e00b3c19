//! Order repository for database operations
//!
//! Order numbers are unique by constraint; an insert that collides
//! surfaces the violation to the workflow, which retries with a fresh
//! number.

use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use tracing::info;
use uuid::Uuid;

use crate::models::order::{
    NewOrderRecord, Order, OrderStatus, OrderTicket, PaymentStatus,
};

/// Name of the unique constraint on the order number column
pub const ORDER_NUMBER_CONSTRAINT: &str = "orders_order_number_key";

fn order_from_row(row: &PgRow) -> Result<Order, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<OrderStatus>()
        .map_err(|e| sqlx::Error::Decode(e.into()))?;
    let payment_status: String = row.try_get("payment_status")?;
    let payment_status = payment_status
        .parse::<PaymentStatus>()
        .map_err(|e| sqlx::Error::Decode(e.into()))?;
    let tickets: Json<Vec<OrderTicket>> = row.try_get("tickets")?;

    Ok(Order {
        id: row.try_get("id")?,
        order_number: row.try_get("order_number")?,
        user_id: row.try_get("user_id")?,
        user_email: row.try_get("user_email")?,
        user_name: row.try_get("user_name")?,
        user_phone: row.try_get("user_phone")?,
        user_id_number: row.try_get("user_id_number")?,
        show_id: row.try_get("show_id")?,
        show_title: row.try_get("show_title")?,
        show_date: row.try_get("show_date")?,
        show_venue: row.try_get("show_venue")?,
        tickets: tickets.0,
        total_amount: row.try_get("total_amount")?,
        status,
        payment_status,
        gift_card_code: row.try_get("gift_card_code")?,
        gift_card_amount_used: row.try_get("gift_card_amount_used")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

const ORDER_COLUMNS: &str = r#"id, order_number, user_id, user_email, user_name, user_phone,
user_id_number, show_id, show_title, show_date, show_venue, tickets, total_amount, status,
payment_status, gift_card_code, gift_card_amount_used, created_at, updated_at"#;

/// Order repository
#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    /// Create a new order repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one order row
    pub async fn insert(&self, record: &NewOrderRecord) -> Result<Order, sqlx::Error> {
        info!("Inserting order: {}", record.order_number);

        let sql = format!(
            r#"
            INSERT INTO orders (order_number, user_id, user_email, user_name, user_phone,
                                user_id_number, show_id, show_title, show_date, show_venue,
                                tickets, total_amount, status, payment_status,
                                gift_card_code, gift_card_amount_used)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(&record.order_number)
            .bind(record.user_id)
            .bind(&record.user_email)
            .bind(&record.user_name)
            .bind(&record.user_phone)
            .bind(&record.user_id_number)
            .bind(record.show_id)
            .bind(&record.show_title)
            .bind(record.show_date)
            .bind(&record.show_venue)
            .bind(Json(&record.tickets))
            .bind(record.total_amount)
            .bind(record.status.as_str())
            .bind(record.payment_status.as_str())
            .bind(&record.gift_card_code)
            .bind(record.gift_card_amount_used)
            .fetch_one(&self.pool)
            .await?;

        order_from_row(&row)
    }

    /// Find an order by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, sqlx::Error> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;

        row.as_ref().map(order_from_row).transpose()
    }

    /// Find an order by its human-facing order number
    pub async fn find_by_order_number(
        &self,
        order_number: &str,
    ) -> Result<Option<Order>, sqlx::Error> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = $1");
        let row = sqlx::query(&sql)
            .bind(order_number)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(order_from_row).transpose()
    }

    /// List a user's orders, newest first
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, sqlx::Error> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(order_from_row).collect()
    }

    /// List all orders, newest first
    pub async fn list_all(&self) -> Result<Vec<Order>, sqlx::Error> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(order_from_row).collect()
    }

    /// Persist a status change
    pub async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, sqlx::Error> {
        info!("Updating order {} status to {}", id, status.as_str());

        let sql = format!(
            r#"
            UPDATE orders
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(order_from_row).transpose()
    }
}
