use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::utils::error::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventBooking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

/// A booking joined with the event it is for, as returned by the listing
/// endpoint.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BookingWithEvent {
    pub id: Uuid,
    pub event_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
}

impl EventBooking {
    pub async fn exists(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        event_id: Uuid,
    ) -> AppResult<bool> {
        let found: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM event_bookings WHERE user_id = $1 AND event_id = $2 AND quantity >= 1",
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(found.is_some())
    }

    /// One booking row per user per event, always quantity 1. The unique
    /// index on (user_id, event_id) backs up the pre-check under concurrency.
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        event_id: Uuid,
    ) -> AppResult<EventBooking> {
        let booking = sqlx::query_as::<_, EventBooking>(
            r#"INSERT INTO event_bookings (user_id, event_id, quantity)
               VALUES ($1, $2, 1)
               RETURNING *"#,
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(booking)
    }

    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> AppResult<Vec<BookingWithEvent>> {
        let bookings = sqlx::query_as::<_, BookingWithEvent>(
            r#"SELECT b.id, b.event_id, b.quantity, b.created_at,
                      e.title, e.location, e.start_time
               FROM event_bookings b
               JOIN events e ON e.id = b.event_id
               WHERE b.user_id = $1
               ORDER BY e.start_time ASC"#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(bookings)
    }
}
