use crate::utils::error::AppResult;

/// Mocked transactional email sender. Messages are logged rather than
/// relayed; the interface is the seam where a real SMTP provider would go.
#[derive(Debug, Clone, Default)]
pub struct EmailSender;

impl EmailSender {
    pub fn new() -> Self {
        Self
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        tracing::info!(
            recipient = %to,
            subject = %subject,
            body_len = body.len(),
            "Email dispatched (mock transport)"
        );
        Ok(())
    }
}
