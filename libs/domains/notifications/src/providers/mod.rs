//! Email provider implementations.
//!
//! This module contains the `EmailProvider` trait and implementations
//! for the delivery backends.

mod disabled;
mod memory;
mod resend;

pub use disabled::DisabledEmailProvider;
pub use memory::InMemoryEmailProvider;
pub use resend::{ResendConfig, ResendProvider};

use crate::error::NotificationResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Represents a sent email with provider-specific message ID.
#[derive(Debug, Clone)]
pub struct SentEmail {
    /// Provider-specific message ID for tracking.
    pub message_id: Option<String>,
    /// Whether the email was accepted for delivery.
    pub accepted: bool,
}

/// Email content ready for sending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailContent {
    /// Recipient email address.
    pub to_email: String,
    /// Email subject.
    pub subject: String,
    /// HTML body content.
    pub html_body: String,
    /// Plain text body content.
    pub text_body: String,
}

/// Trait for email sending providers.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Send an email.
    async fn send(&self, email: &EmailContent) -> NotificationResult<SentEmail>;

    /// Get the provider name for logging.
    fn name(&self) -> &'static str;

    /// Check if the provider is healthy/configured.
    async fn health_check(&self) -> NotificationResult<bool>;
}

/// Resend when an API key is configured, otherwise a provider that drops mail.
pub fn provider_from_config(config: Option<ResendConfig>) -> Arc<dyn EmailProvider> {
    match config {
        Some(config) => Arc::new(ResendProvider::new(config)),
        None => {
            tracing::warn!("RESEND_API_KEY not set, outgoing email is disabled");
            Arc::new(DisabledEmailProvider)
        }
    }
}
