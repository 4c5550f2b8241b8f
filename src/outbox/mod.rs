use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::integrations::email::EmailSender;
use crate::integrations::wallet::WalletPassGenerator;
use crate::models::outbox::OutboxTask;
use crate::utils::error::{AppError, AppResult};

pub const KIND_BOOKING_CONFIRMATION: &str = "booking_confirmation";
pub const KIND_PASSWORD_RESET_EMAIL: &str = "password_reset_email";

const CLAIM_BATCH_SIZE: i64 = 10;

/// Payload of a `booking_confirmation` task, captured at enqueue time so the
/// worker needs no joins to execute it.
#[derive(Debug, Serialize, Deserialize)]
pub struct BookingConfirmationPayload {
    pub booking_id: Uuid,
    pub order_id: Uuid,
    pub event_title: String,
    pub buyer_email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PasswordResetPayload {
    pub email: String,
    pub code: String,
    pub expires_minutes: i64,
}

/// Background executor for the durable side-effect queue. Booking handlers
/// enqueue tasks transactionally; this worker drains them, retrying with
/// backoff. A task failure never affects the committed booking.
pub struct OutboxWorker {
    pool: PgPool,
    wallet: WalletPassGenerator,
    email: EmailSender,
    poll_interval: Duration,
}

impl OutboxWorker {
    pub fn new(
        pool: PgPool,
        wallet: WalletPassGenerator,
        email: EmailSender,
        poll_interval: Duration,
    ) -> Self {
        Self {
            pool,
            wallet,
            email,
            poll_interval,
        }
    }

    pub async fn run(self) {
        tracing::info!(interval = ?self.poll_interval, "Outbox worker started");
        loop {
            match self.tick().await {
                Ok(0) => {}
                Ok(n) => tracing::debug!(processed = n, "Outbox batch processed"),
                Err(e) => tracing::error!(error = ?e, "Outbox tick failed"),
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Claim due tasks, execute them, and write back the outcome, all under
    /// one transaction so a crashed worker releases its claims on rollback.
    async fn tick(&self) -> AppResult<usize> {
        let mut tx = self.pool.begin().await?;
        let tasks = OutboxTask::claim_due(&mut tx, CLAIM_BATCH_SIZE).await?;
        let count = tasks.len();

        for task in tasks {
            let attempts = task.attempts + 1;
            match self.execute(&task).await {
                Ok(()) => {
                    OutboxTask::mark_done(&mut tx, task.id).await?;
                    tracing::info!(task_id = %task.id, kind = %task.kind, "Outbox task done");
                }
                Err(e) => {
                    tracing::warn!(
                        task_id = %task.id,
                        kind = %task.kind,
                        attempts,
                        error = ?e,
                        "Outbox task failed"
                    );
                    OutboxTask::record_failure(&mut tx, task.id, attempts, &e.to_string()).await?;
                }
            }
        }

        tx.commit().await?;
        Ok(count)
    }

    async fn execute(&self, task: &OutboxTask) -> AppResult<()> {
        match task.kind.as_str() {
            KIND_BOOKING_CONFIRMATION => {
                let payload: BookingConfirmationPayload =
                    serde_json::from_value(task.payload.clone()).map_err(|e| {
                        AppError::InternalServerError(format!("malformed outbox payload: {e}"))
                    })?;

                // Wallet pass first; the confirmation email goes out only
                // once the pass exists, mirroring the booking flow's
                // wallet-then-email ordering.
                let pass = self
                    .wallet
                    .generate_event_pass(
                        payload.booking_id,
                        &payload.event_title,
                        &payload.buyer_email,
                    )
                    .await?;

                self.email
                    .send(
                        &payload.buyer_email,
                        &format!("Your ticket for {}", payload.event_title),
                        &format!(
                            "Your booking is confirmed. Add your ticket to your wallet: {}",
                            pass.wallet_url
                        ),
                    )
                    .await
            }
            KIND_PASSWORD_RESET_EMAIL => {
                let payload: PasswordResetPayload = serde_json::from_value(task.payload.clone())
                    .map_err(|e| {
                        AppError::InternalServerError(format!("malformed outbox payload: {e}"))
                    })?;

                self.email
                    .send(
                        &payload.email,
                        "Your DutyDinar password reset code",
                        &format!(
                            "Your reset code is {}. It expires in {} minutes.",
                            payload.code, payload.expires_minutes
                        ),
                    )
                    .await
            }
            other => Err(AppError::InternalServerError(format!(
                "unknown outbox task kind: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_payload_roundtrips() {
        let payload = BookingConfirmationPayload {
            booking_id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            event_title: "Gulf Foods Fair".to_string(),
            buyer_email: "buyer@example.com".to_string(),
        };
        let value = serde_json::to_value(&payload).unwrap();
        let back: BookingConfirmationPayload = serde_json::from_value(value).unwrap();
        assert_eq!(back.booking_id, payload.booking_id);
        assert_eq!(back.event_title, "Gulf Foods Fair");
    }

    #[test]
    fn test_reset_payload_roundtrips() {
        let value = serde_json::json!({
            "email": "a@b.c",
            "code": "123456",
            "expires_minutes": 15,
        });
        let payload: PasswordResetPayload = serde_json::from_value(value).unwrap();
        assert_eq!(payload.code, "123456");
        assert_eq!(payload.expires_minutes, 15);
    }
}
