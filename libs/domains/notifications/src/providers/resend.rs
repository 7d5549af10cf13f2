//! Resend email provider implementation.

use super::{EmailContent, EmailProvider, SentEmail};
use crate::error::{NotificationError, NotificationResult};
use async_trait::async_trait;
use core_config::{ConfigError, env_optional, env_or_default, env_parse};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

/// Resend API configuration.
///
/// Environment variables:
/// - `RESEND_API_KEY` (optional) - delivery is disabled when unset
/// - `EMAIL_FROM` (optional, default: `noreply@localhost`)
/// - `EMAIL_TIMEOUT_SECS` (optional, default: 10)
#[derive(Debug, Clone)]
pub struct ResendConfig {
    pub api_key: String,
    pub from_email: String,
    pub api_url: String,
    pub timeout: Duration,
}

impl ResendConfig {
    pub fn new(api_key: String, from_email: String) -> Self {
        Self {
            api_key,
            from_email,
            api_url: "https://api.resend.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_api_url(mut self, api_url: String) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `None` when no API key is configured.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(api_key) = env_optional("RESEND_API_KEY") else {
            return Ok(None);
        };
        let from_email = env_or_default("EMAIL_FROM", "noreply@localhost");
        let timeout_secs: u64 = env_parse("EMAIL_TIMEOUT_SECS", "10")?;

        Ok(Some(
            Self::new(api_key, from_email).with_timeout(Duration::from_secs(timeout_secs)),
        ))
    }
}

/// Resend email provider.
pub struct ResendProvider {
    config: ResendConfig,
    client: Client,
}

impl ResendProvider {
    pub fn new(config: ResendConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResendResponse {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResendErrorBody {
    message: String,
}

impl<'a> ResendRequest<'a> {
    fn new(from: &'a str, email: &'a EmailContent) -> Self {
        Self {
            from,
            to: [email.to_email.as_str()],
            subject: &email.subject,
            html: &email.html_body,
            text: &email.text_body,
        }
    }
}

#[async_trait]
impl EmailProvider for ResendProvider {
    async fn send(&self, email: &EmailContent) -> NotificationResult<SentEmail> {
        if !email.to_email.contains('@') {
            return Err(NotificationError::InvalidEmail(email.to_email.clone()));
        }

        debug!(to = %email.to_email, subject = %email.subject, "Sending email via Resend");

        let request = ResendRequest::new(&self.config.from_email, email);
        let response = self
            .client
            .post(format!("{}/emails", self.config.api_url))
            .bearer_auth(&self.config.api_key)
            .timeout(self.config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotificationError::Timeout(self.config.timeout.as_secs())
                } else {
                    e.into()
                }
            })?;

        let status = response.status();
        if status.is_success() {
            let message_id = response
                .json::<ResendResponse>()
                .await
                .ok()
                .and_then(|body| body.id);
            info!(to = %email.to_email, message_id = ?message_id, "Email sent successfully via Resend");
            return Ok(SentEmail {
                message_id,
                accepted: true,
            });
        }

        let error_body = response.text().await.unwrap_or_default();
        error!(to = %email.to_email, status = %status, error = %error_body, "Failed to send email via Resend");

        let error_message = serde_json::from_str::<ResendErrorBody>(&error_body)
            .map(|body| body.message)
            .unwrap_or(error_body);

        Err(NotificationError::ProviderError(format!(
            "Resend error ({}): {}",
            status, error_message
        )))
    }

    fn name(&self) -> &'static str {
        "Resend"
    }

    async fn health_check(&self) -> NotificationResult<bool> {
        // Resend has no health endpoint; keys are issued with a fixed prefix
        if self.config.api_key.starts_with("re_") {
            Ok(true)
        } else {
            Err(NotificationError::ConfigError(
                "Invalid Resend API key format".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resend_config_new() {
        let config = ResendConfig::new("re_test".to_string(), "events@uwaterloo.ca".to_string());
        assert_eq!(config.api_url, "https://api.resend.com");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_from_env_without_key_is_none() {
        temp_env::with_var_unset("RESEND_API_KEY", || {
            assert!(ResendConfig::from_env().unwrap().is_none());
        });
    }

    #[test]
    fn test_from_env_reads_sender_and_timeout() {
        temp_env::with_vars(
            [
                ("RESEND_API_KEY", Some("re_abc")),
                ("EMAIL_FROM", Some("events@uwaterloo.ca")),
                ("EMAIL_TIMEOUT_SECS", Some("3")),
            ],
            || {
                let config = ResendConfig::from_env().unwrap().unwrap();
                assert_eq!(config.api_key, "re_abc");
                assert_eq!(config.from_email, "events@uwaterloo.ca");
                assert_eq!(config.timeout, Duration::from_secs(3));
            },
        );
    }

    #[test]
    fn test_from_env_rejects_bad_timeout() {
        temp_env::with_vars(
            [
                ("RESEND_API_KEY", Some("re_abc")),
                ("EMAIL_TIMEOUT_SECS", Some("soon")),
            ],
            || {
                assert!(ResendConfig::from_env().is_err());
            },
        );
    }

    #[test]
    fn test_request_body_shape() {
        let email = EmailContent {
            to_email: "ada@uwaterloo.ca".to_string(),
            subject: "Verify".to_string(),
            html_body: "<p>hi</p>".to_string(),
            text_body: "hi".to_string(),
        };
        let body = serde_json::to_value(ResendRequest::new("events@uwaterloo.ca", &email)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "from": "events@uwaterloo.ca",
                "to": ["ada@uwaterloo.ca"],
                "subject": "Verify",
                "html": "<p>hi</p>",
                "text": "hi",
            })
        );
    }

    #[tokio::test]
    async fn test_health_check_validates_key_prefix() {
        let ok = ResendProvider::new(ResendConfig::new("re_x".into(), "a@b.c".into()));
        assert!(ok.health_check().await.unwrap());

        let bad = ResendProvider::new(ResendConfig::new("sk_x".into(), "a@b.c".into()));
        assert!(bad.health_check().await.is_err());
    }
}
