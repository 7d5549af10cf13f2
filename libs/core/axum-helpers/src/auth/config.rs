//! JWT configuration loaded through `core_config::FromEnv`.

use core_config::{ConfigError, FromEnv, env_parse, env_required};

const MIN_SECRET_LEN: usize = 32;

/// JWT authentication configuration.
///
/// Environment variables:
/// - `JWT_SECRET` (required) - at least 32 characters
/// - `JWT_TTL_SECS` (optional, default: 86400) - access token lifetime
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// HMAC signing secret
    pub secret: String,
    /// Access token lifetime in seconds
    pub ttl_secs: i64,
}

impl JwtConfig {
    /// Build a config from an explicit secret, applying the same length rule as `from_env`.
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        check_secret(&secret)?;
        Ok(Self {
            secret,
            ttl_secs: 86_400,
        })
    }

    pub fn with_ttl(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }
}

fn check_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_LEN {
        return Err(ConfigError::ParseError {
            key: "JWT_SECRET".to_string(),
            details: format!(
                "must be at least {} characters (got {}). Generate one with: openssl rand -base64 32",
                MIN_SECRET_LEN,
                secret.len()
            ),
        });
    }
    Ok(())
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;
        check_secret(&secret)?;
        let ttl_secs = env_parse("JWT_TTL_SECS", "86400")?;

        Ok(Self { secret, ttl_secs })
    }
}
