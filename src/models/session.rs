use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::utils::error::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub async fn create(
        pool: &PgPool,
        token: &str,
        user_id: Uuid,
        ttl_hours: i64,
    ) -> AppResult<Session> {
        let expires_at = Utc::now() + Duration::hours(ttl_hours);
        let session = sqlx::query_as::<_, Session>(
            r#"INSERT INTO sessions (token, user_id, expires_at)
               VALUES ($1, $2, $3)
               RETURNING *"#,
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(pool)
        .await?;
        Ok(session)
    }

    /// Look up a session by token, ignoring expired rows.
    pub async fn find_valid(pool: &PgPool, token: &str) -> AppResult<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE token = $1 AND expires_at > now()",
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;
        Ok(session)
    }

    pub async fn delete(pool: &PgPool, token: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(pool)
            .await?;
        Ok(())
    }
}
