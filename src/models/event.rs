use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::utils::error::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub price: Decimal,
    pub available_tickets: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub async fn create(
        pool: &PgPool,
        organizer_id: Uuid,
        title: &str,
        description: Option<&str>,
        location: &str,
        start_time: DateTime<Utc>,
        end_time: Option<DateTime<Utc>>,
        price: Decimal,
        available_tickets: i32,
    ) -> AppResult<Event> {
        let event = sqlx::query_as::<_, Event>(
            r#"INSERT INTO events
                   (organizer_id, title, description, location, start_time, end_time,
                    price, available_tickets)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING *"#,
        )
        .bind(organizer_id)
        .bind(title)
        .bind(description)
        .bind(location)
        .bind(start_time)
        .bind(end_time)
        .bind(price)
        .bind(available_tickets)
        .fetch_one(pool)
        .await?;
        Ok(event)
    }

    pub async fn list(pool: &PgPool) -> AppResult<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY start_time ASC")
            .fetch_all(pool)
            .await?;
        Ok(events)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> AppResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(event)
    }

    /// Atomic conditional decrement of the ticket counter. Returns the
    /// post-decrement count, or `None` when fewer than `quantity` tickets
    /// remain, in which case no row was touched. The
    /// `available_tickets >= $1` predicate is what keeps two concurrent
    /// buyers of the last ticket from both succeeding.
    pub async fn try_reserve_tickets(
        tx: &mut Transaction<'_, Postgres>,
        event_id: Uuid,
        quantity: i32,
    ) -> AppResult<Option<i32>> {
        let remaining: Option<(i32,)> = sqlx::query_as(
            r#"UPDATE events
               SET available_tickets = available_tickets - $1, updated_at = now()
               WHERE id = $2 AND available_tickets >= $1
               RETURNING available_tickets"#,
        )
        .bind(quantity)
        .bind(event_id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(remaining.map(|(n,)| n))
    }
}
