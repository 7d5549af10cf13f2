use super::{EmailContent, EmailProvider, SentEmail};
use crate::error::NotificationResult;
use async_trait::async_trait;

/// Provider used when delivery is not configured; nothing leaves the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledEmailProvider;

#[async_trait]
impl EmailProvider for DisabledEmailProvider {
    async fn send(&self, email: &EmailContent) -> NotificationResult<SentEmail> {
        tracing::info!(to = %email.to_email, subject = %email.subject, "Email delivery disabled, not sending");
        Ok(SentEmail {
            message_id: None,
            accepted: false,
        })
    }

    fn name(&self) -> &'static str {
        "Disabled"
    }

    async fn health_check(&self) -> NotificationResult<bool> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_provider_never_accepts() {
        let sent = DisabledEmailProvider
            .send(&EmailContent {
                to_email: "ada@uwaterloo.ca".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(!sent.accepted);
        assert!(!DisabledEmailProvider.health_check().await.unwrap());
    }
}
