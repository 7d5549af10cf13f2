//! Error types for the notifications domain.

use thiserror::Error;

/// Result type for notification operations.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Errors that can occur while delivering email.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Email provider rejected the request or was unreachable.
    #[error("Email provider error: {0}")]
    ProviderError(String),

    /// Provider did not answer within the configured timeout.
    #[error("Email provider timed out after {0}s")]
    Timeout(u64),

    /// Template rendering error.
    #[error("Template rendering error: {0}")]
    TemplateError(String),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<handlebars::RenderError> for NotificationError {
    fn from(err: handlebars::RenderError) -> Self {
        NotificationError::TemplateError(err.to_string())
    }
}

impl From<handlebars::TemplateError> for NotificationError {
    fn from(err: handlebars::TemplateError) -> Self {
        NotificationError::TemplateError(err.to_string())
    }
}

impl From<reqwest::Error> for NotificationError {
    fn from(err: reqwest::Error) -> Self {
        NotificationError::ProviderError(err.to_string())
    }
}
