use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, Postgres, Transaction};
use uuid::Uuid;

use crate::utils::error::AppResult;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_DONE: &str = "done";
pub const STATUS_FAILED: &str = "failed";

pub const MAX_ATTEMPTS: i32 = 5;
const BASE_BACKOFF_SECS: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OutboxTask {
    pub id: Uuid,
    pub kind: String,
    pub payload: Value,
    pub status: String,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub next_attempt_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Exponential backoff: 30s, 60s, 120s, ... after each failed attempt.
pub fn backoff_delay(attempts: i32) -> Duration {
    let exp = attempts.saturating_sub(1).clamp(0, 10);
    Duration::seconds(BASE_BACKOFF_SECS << exp)
}

impl OutboxTask {
    /// Enqueue inside the caller's transaction so the task commits or rolls
    /// back together with the business writes.
    pub async fn enqueue(
        tx: &mut Transaction<'_, Postgres>,
        kind: &str,
        payload: &Value,
    ) -> AppResult<Uuid> {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"INSERT INTO outbox_tasks (kind, payload)
               VALUES ($1, $2)
               RETURNING id"#,
        )
        .bind(kind)
        .bind(payload)
        .fetch_one(&mut **tx)
        .await?;
        Ok(id)
    }

    /// Claim a batch of due tasks. SKIP LOCKED lets multiple workers poll the
    /// same table without contending on the same rows.
    pub async fn claim_due(
        tx: &mut Transaction<'_, Postgres>,
        limit: i64,
    ) -> AppResult<Vec<OutboxTask>> {
        let tasks = sqlx::query_as::<_, OutboxTask>(
            r#"SELECT * FROM outbox_tasks
               WHERE status = 'pending' AND next_attempt_at <= now()
               ORDER BY next_attempt_at ASC
               LIMIT $1
               FOR UPDATE SKIP LOCKED"#,
        )
        .bind(limit)
        .fetch_all(&mut **tx)
        .await?;
        Ok(tasks)
    }

    pub async fn mark_done(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE outbox_tasks SET status = $1, updated_at = now() WHERE id = $2")
            .bind(STATUS_DONE)
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Record a failed attempt. The task is retried with backoff until
    /// MAX_ATTEMPTS, then parked as failed.
    pub async fn record_failure(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        attempts: i32,
        error: &str,
    ) -> AppResult<()> {
        let (status, next_attempt_at) = if attempts >= MAX_ATTEMPTS {
            (STATUS_FAILED, Utc::now())
        } else {
            (STATUS_PENDING, Utc::now() + backoff_delay(attempts))
        };
        sqlx::query(
            r#"UPDATE outbox_tasks
               SET status = $1, attempts = $2, last_error = $3,
                   next_attempt_at = $4, updated_at = now()
               WHERE id = $5"#,
        )
        .bind(status)
        .bind(attempts)
        .bind(error)
        .bind(next_attempt_at)
        .bind(id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_per_attempt() {
        assert_eq!(backoff_delay(1), Duration::seconds(30));
        assert_eq!(backoff_delay(2), Duration::seconds(60));
        assert_eq!(backoff_delay(3), Duration::seconds(120));
        assert_eq!(backoff_delay(4), Duration::seconds(240));
    }

    #[test]
    fn test_backoff_handles_degenerate_attempts() {
        assert_eq!(backoff_delay(0), Duration::seconds(30));
        assert_eq!(backoff_delay(-3), Duration::seconds(30));
        // Clamped so the shift cannot overflow.
        assert_eq!(backoff_delay(100), Duration::seconds(30 << 10));
    }
}
