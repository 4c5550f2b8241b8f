use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::utils::error::AppResult;

pub const ORDER_TYPE_EVENT: &str = "event";
pub const ORDER_STATUS_PENDING: &str = "pending";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub order_type: String,
    pub total_amount: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub event_id: Option<Uuid>,
    pub quantity: i32,
    pub price: Decimal,
}

impl Order {
    pub async fn create_pending_event_order(
        tx: &mut Transaction<'_, Postgres>,
        buyer_id: Uuid,
        total_amount: Decimal,
    ) -> AppResult<Order> {
        let order = sqlx::query_as::<_, Order>(
            r#"INSERT INTO orders (buyer_id, order_type, total_amount, status)
               VALUES ($1, $2, $3, $4)
               RETURNING *"#,
        )
        .bind(buyer_id)
        .bind(ORDER_TYPE_EVENT)
        .bind(total_amount)
        .bind(ORDER_STATUS_PENDING)
        .fetch_one(&mut **tx)
        .await?;
        Ok(order)
    }

    pub async fn list_for_buyer(pool: &PgPool, buyer_id: Uuid) -> AppResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE buyer_id = $1 ORDER BY created_at DESC",
        )
        .bind(buyer_id)
        .fetch_all(pool)
        .await?;
        Ok(orders)
    }

    pub async fn find_for_buyer(
        pool: &PgPool,
        id: Uuid,
        buyer_id: Uuid,
    ) -> AppResult<Option<Order>> {
        let order =
            sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 AND buyer_id = $2")
                .bind(id)
                .bind(buyer_id)
                .fetch_optional(pool)
                .await?;
        Ok(order)
    }
}

impl OrderItem {
    pub async fn create_event_item(
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
        event_id: Uuid,
        quantity: i32,
        price: Decimal,
    ) -> AppResult<OrderItem> {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"INSERT INTO order_items (order_id, event_id, quantity, price)
               VALUES ($1, $2, $3, $4)
               RETURNING *"#,
        )
        .bind(order_id)
        .bind(event_id)
        .bind(quantity)
        .bind(price)
        .fetch_one(&mut **tx)
        .await?;
        Ok(item)
    }

    pub async fn list_for_order(pool: &PgPool, order_id: Uuid) -> AppResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = $1")
            .bind(order_id)
            .fetch_all(pool)
            .await?;
        Ok(items)
    }
}
