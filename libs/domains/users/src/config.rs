//! Account policy loaded through `core_config::FromEnv`.

use core_config::{ConfigError, Environment, FromEnv, env_optional, env_or_default};

/// Registration and session settings.
///
/// - `PUBLIC_BASE_URL` (default: `http://localhost:8080`), prefix of verification links
/// - `ALLOWED_EMAIL_DOMAIN` (optional), e.g. `uwaterloo.ca`
/// - `ADMIN_EMAILS` (comma-separated), registered as moderators
/// - `APP_ENV=production` marks session cookies `Secure`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountsConfig {
    pub public_base_url: String,
    pub allowed_email_domain: Option<String>,
    pub admin_emails: Vec<String>,
    pub secure_cookies: bool,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            public_base_url: "http://localhost:8080".to_string(),
            allowed_email_domain: None,
            admin_emails: Vec::new(),
            secure_cookies: false,
        }
    }
}

impl AccountsConfig {
    pub fn with_allowed_email_domain(mut self, domain: impl Into<String>) -> Self {
        self.allowed_email_domain = Some(domain.into().trim_start_matches('@').to_lowercase());
        self
    }

    pub fn with_admin_emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.admin_emails = emails
            .into_iter()
            .map(|e| e.as_ref().trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Link mailed to the account owner
    pub fn verification_link(&self, token: &str) -> String {
        format!("{}/api/auth/verify-email/{}", self.public_base_url, token)
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.iter().any(|admin| admin == email)
    }

    /// Whether `email` (already normalized) may register
    pub fn allows_email(&self, email: &str) -> bool {
        match &self.allowed_email_domain {
            Some(domain) => email.ends_with(&format!("@{}", domain)),
            None => true,
        }
    }
}

impl FromEnv for AccountsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default()
            .with_public_base_url(env_or_default("PUBLIC_BASE_URL", "http://localhost:8080"))
            .with_admin_emails(env_or_default("ADMIN_EMAILS", "").split(','));

        if let Some(domain) = env_optional("ALLOWED_EMAIL_DOMAIN") {
            config = config.with_allowed_email_domain(domain);
        }
        config.secure_cookies = Environment::from_env().use_https();

        Ok(config)
    }
}
