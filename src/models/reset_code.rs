use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::utils::error::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PasswordResetCode {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetCode {
    /// Created inside the caller's transaction so the code and its outbox
    /// email task commit together.
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        code: &str,
        ttl_minutes: i64,
    ) -> AppResult<PasswordResetCode> {
        let expires_at = Utc::now() + Duration::minutes(ttl_minutes);
        let row = sqlx::query_as::<_, PasswordResetCode>(
            r#"INSERT INTO password_reset_codes (user_id, code, expires_at)
               VALUES ($1, $2, $3)
               RETURNING *"#,
        )
        .bind(user_id)
        .bind(code)
        .bind(expires_at)
        .fetch_one(&mut **tx)
        .await?;
        Ok(row)
    }

    /// Latest unconsumed, unexpired code for a user.
    pub async fn find_active(pool: &PgPool, user_id: Uuid) -> AppResult<Option<PasswordResetCode>> {
        let row = sqlx::query_as::<_, PasswordResetCode>(
            r#"SELECT * FROM password_reset_codes
               WHERE user_id = $1 AND used_at IS NULL AND expires_at > now()
               ORDER BY created_at DESC
               LIMIT 1"#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    /// Consume the code so it cannot be replayed. Returns false if it was
    /// already used or expired in the meantime. Runs in the caller's
    /// transaction so a code is never burned without the password change
    /// landing with it.
    pub async fn consume(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r#"UPDATE password_reset_codes SET used_at = now()
               WHERE id = $1 AND used_at IS NULL AND expires_at > now()"#,
        )
        .bind(id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
