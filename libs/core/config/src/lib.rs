pub mod server;
pub mod tracing;

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },
}

/// Application environment
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        if app_env.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    // Secure cookies are only issued over HTTPS
    pub fn use_https(&self) -> bool {
        self.is_production()
    }
}

/// Name and version of the running binary, reported by `/health`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppInfo {
    pub name: &'static str,
    pub version: &'static str,
}

/// Builds an [`AppInfo`] from the calling crate's Cargo metadata.
#[macro_export]
macro_rules! app_info {
    () => {
        $crate::AppInfo {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        }
    };
}

/// Trait for configuration that can be loaded from environment variables
pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

/// Helper to load an environment variable with a default value
pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Helper to load an environment variable or return error
pub fn env_required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Helper to load an optional environment variable, treating blank values as unset
pub fn env_optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Helper to load and parse an environment variable with a default value
pub fn env_parse<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    env_or_default(key, default)
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::ParseError {
            key: key.to_string(),
            details: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_defaults_to_development() {
        temp_env::with_var_unset("APP_ENV", || {
            let env = Environment::from_env();
            assert_eq!(env, Environment::Development);
            assert!(env.is_development());
            assert!(!env.use_https());
        });
    }

    #[test]
    fn test_environment_production_is_case_insensitive() {
        temp_env::with_var("APP_ENV", Some("PRODUCTION"), || {
            let env = Environment::from_env();
            assert_eq!(env, Environment::Production);
            assert!(env.use_https());
        });
    }

    #[test]
    fn test_environment_unknown_value_falls_back() {
        temp_env::with_var("APP_ENV", Some("staging"), || {
            assert_eq!(Environment::from_env(), Environment::Development);
        });
    }

    #[test]
    fn test_app_info_macro_uses_crate_metadata() {
        let info = app_info!();
        assert_eq!(info.name, "core_config");
        assert!(!info.version.is_empty());
    }

    #[test]
    fn test_env_required_missing() {
        temp_env::with_var_unset("CAMPUS_MISSING_REQUIRED", || {
            let err = env_required("CAMPUS_MISSING_REQUIRED").unwrap_err();
            assert!(err.to_string().contains("CAMPUS_MISSING_REQUIRED"));
        });
    }

    #[test]
    fn test_env_optional_treats_blank_as_unset() {
        temp_env::with_var("CAMPUS_OPTIONAL", Some("   "), || {
            assert_eq!(env_optional("CAMPUS_OPTIONAL"), None);
        });
        temp_env::with_var("CAMPUS_OPTIONAL", Some(" value "), || {
            assert_eq!(env_optional("CAMPUS_OPTIONAL"), Some("value".to_string()));
        });
    }

    #[test]
    fn test_env_parse_default_and_override() {
        temp_env::with_var_unset("CAMPUS_TIMEOUT", || {
            let value: u64 = env_parse("CAMPUS_TIMEOUT", "10").unwrap();
            assert_eq!(value, 10);
        });
        temp_env::with_var("CAMPUS_TIMEOUT", Some("25"), || {
            let value: u64 = env_parse("CAMPUS_TIMEOUT", "10").unwrap();
            assert_eq!(value, 25);
        });
    }

    #[test]
    fn test_env_parse_reports_key_on_failure() {
        temp_env::with_var("CAMPUS_THRESHOLD", Some("high"), || {
            let err = env_parse::<f32>("CAMPUS_THRESHOLD", "0.25").unwrap_err();
            match err {
                ConfigError::ParseError { key, .. } => assert_eq!(key, "CAMPUS_THRESHOLD"),
                other => panic!("unexpected error: {other}"),
            }
        });
    }
}
