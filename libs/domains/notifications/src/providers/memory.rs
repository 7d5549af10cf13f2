//! Capturing email provider for testing

use super::{EmailContent, EmailProvider, SentEmail};
use crate::error::{NotificationError, NotificationResult};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Provider that records every email instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEmailProvider {
    sent_emails: Arc<Mutex<Vec<EmailContent>>>,
    should_fail: bool,
}

impl InMemoryEmailProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose every send fails
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub async fn sent_emails(&self) -> Vec<EmailContent> {
        self.sent_emails.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent_emails.lock().await.len()
    }

    pub async fn was_sent_to(&self, email: &str) -> bool {
        self.sent_emails
            .lock()
            .await
            .iter()
            .any(|e| e.to_email == email)
    }
}

#[async_trait]
impl EmailProvider for InMemoryEmailProvider {
    async fn send(&self, email: &EmailContent) -> NotificationResult<SentEmail> {
        if self.should_fail {
            return Err(NotificationError::ProviderError("Mock failure".to_string()));
        }

        let mut sent = self.sent_emails.lock().await;
        sent.push(email.clone());

        Ok(SentEmail {
            message_id: Some(format!("mem-{}", sent.len())),
            accepted: true,
        })
    }

    fn name(&self) -> &'static str {
        "InMemory"
    }

    async fn health_check(&self) -> NotificationResult<bool> {
        Ok(!self.should_fail)
    }
}
