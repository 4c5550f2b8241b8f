use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::utils::error::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub body: String,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub async fn send(
        pool: &PgPool,
        sender_id: Uuid,
        recipient_id: Uuid,
        body: &str,
    ) -> AppResult<Message> {
        let message = sqlx::query_as::<_, Message>(
            r#"INSERT INTO messages (sender_id, recipient_id, body)
               VALUES ($1, $2, $3)
               RETURNING *"#,
        )
        .bind(sender_id)
        .bind(recipient_id)
        .bind(body)
        .fetch_one(pool)
        .await?;
        Ok(message)
    }

    /// Both directions of a conversation, oldest first.
    pub async fn conversation(pool: &PgPool, me: Uuid, other: Uuid) -> AppResult<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"SELECT * FROM messages
               WHERE (sender_id = $1 AND recipient_id = $2)
                  OR (sender_id = $2 AND recipient_id = $1)
               ORDER BY created_at ASC"#,
        )
        .bind(me)
        .bind(other)
        .fetch_all(pool)
        .await?;
        Ok(messages)
    }

    pub async fn mark_read(pool: &PgPool, recipient_id: Uuid, sender_id: Uuid) -> AppResult<()> {
        sqlx::query(
            r#"UPDATE messages SET read_at = now()
               WHERE recipient_id = $1 AND sender_id = $2 AND read_at IS NULL"#,
        )
        .bind(recipient_id)
        .bind(sender_id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
