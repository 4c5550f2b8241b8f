use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::utils::error::{AppError, AppResult};

/// Mocked Apple/Google wallet-pass issuer. Writes the pass payload as a JSON
/// artifact and returns a fabricated hosted URL. Certificate-based signing is
/// deliberately not implemented.
#[derive(Debug, Clone)]
pub struct WalletPassGenerator {
    pass_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct WalletPass {
    pub pass_id: Uuid,
    pub wallet_url: String,
}

impl WalletPassGenerator {
    pub fn new(pass_dir: impl AsRef<Path>) -> Self {
        Self {
            pass_dir: pass_dir.as_ref().to_path_buf(),
        }
    }

    pub async fn generate_event_pass(
        &self,
        booking_id: Uuid,
        event_title: &str,
        holder_email: &str,
    ) -> AppResult<WalletPass> {
        let pass_id = Uuid::new_v4();
        let payload = json!({
            "pass_id": pass_id,
            "booking_id": booking_id,
            "event": event_title,
            "holder": holder_email,
            "format": "mock",
        });

        tokio::fs::create_dir_all(&self.pass_dir).await.map_err(|e| {
            AppError::ExternalServiceError(format!("wallet pass dir unavailable: {e}"))
        })?;

        let path = self.pass_dir.join(format!("{pass_id}.json"));
        let bytes = serde_json::to_vec_pretty(&payload)
            .map_err(|e| AppError::InternalServerError(format!("pass serialization: {e}")))?;
        tokio::fs::write(&path, bytes).await.map_err(|e| {
            AppError::ExternalServiceError(format!("wallet pass write failed: {e}"))
        })?;

        Ok(WalletPass {
            pass_id,
            wallet_url: format!("https://wallet.dutydinar.example/passes/{pass_id}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generates_pass_artifact_and_url() {
        let dir = std::env::temp_dir().join(format!("passes-{}", Uuid::new_v4()));
        let generator = WalletPassGenerator::new(&dir);
        let booking_id = Uuid::new_v4();

        let pass = generator
            .generate_event_pass(booking_id, "Dubai Trade Expo", "buyer@example.com")
            .await
            .unwrap();

        assert!(pass.wallet_url.contains(&pass.pass_id.to_string()));

        let written = tokio::fs::read_to_string(dir.join(format!("{}.json", pass.pass_id)))
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["booking_id"], booking_id.to_string());
        assert_eq!(value["event"], "Dubai Trade Expo");

        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
