//! Notifications Domain
//!
//! Outgoing email for account verification.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Users Service  │  ← Renders verification_email(link)
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │ Email Provider  │  ← Resend, disabled, in-memory
//! └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_notifications::{EmailContent, ResendConfig, provider_from_config, verification_email};
//!
//! let provider = provider_from_config(ResendConfig::from_env()?);
//! let rendered = verification_email(&link, 24)?;
//! provider
//!     .send(&EmailContent {
//!         to_email: email.clone(),
//!         subject: rendered.subject,
//!         html_body: rendered.html,
//!         text_body: rendered.text,
//!     })
//!     .await?;
//! ```

pub mod error;
pub mod providers;
pub mod templates;

// Re-export commonly used types
pub use error::{NotificationError, NotificationResult};
pub use providers::{
    DisabledEmailProvider, EmailContent, EmailProvider, InMemoryEmailProvider, ResendConfig,
    ResendProvider, SentEmail, provider_from_config,
};
pub use templates::{RenderedEmail, verification_email};
