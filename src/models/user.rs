use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::utils::error::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub password_salt: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub async fn create(
        pool: &PgPool,
        name: &str,
        email: &str,
        role: &str,
        password_hash: &str,
        password_salt: &str,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"INSERT INTO users (name, email, role, password_hash, password_salt)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(name)
        .bind(email)
        .bind(role)
        .bind(password_hash)
        .bind(password_salt)
        .fetch_one(pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    pub async fn update_password(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        password_hash: &str,
        password_salt: &str,
    ) -> AppResult<()> {
        sqlx::query(
            r#"UPDATE users
               SET password_hash = $1, password_salt = $2, updated_at = now()
               WHERE id = $3"#,
        )
        .bind(password_hash)
        .bind(password_salt)
        .bind(id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
