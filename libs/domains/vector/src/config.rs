//! Embedding and search configuration loaded through `core_config::FromEnv`.

use core_config::{ConfigError, FromEnv, env_or_default, env_parse, env_required};
use std::time::Duration;

/// OpenAI-compatible embeddings endpoint.
///
/// - `OPENAI_API_KEY` (required)
/// - `OPENAI_BASE_URL` (default: `https://api.openai.com/v1`)
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
}

impl OpenAIConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

impl FromEnv for OpenAIConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_key = env_required("OPENAI_API_KEY")?;
        let base_url = env_or_default("OPENAI_BASE_URL", "https://api.openai.com/v1");

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Similarity search tuning.
///
/// - `SEARCH_SIMILARITY_THRESHOLD` (default: 0.25, within -1..=1)
/// - `EMBEDDING_TIMEOUT_SECS` (default: 10)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    pub similarity_threshold: f32,
    pub embedding_timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.25,
            embedding_timeout: Duration::from_secs(10),
        }
    }
}

impl FromEnv for SearchConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let similarity_threshold: f32 = env_parse("SEARCH_SIMILARITY_THRESHOLD", "0.25")?;
        if !(-1.0..=1.0).contains(&similarity_threshold) {
            return Err(ConfigError::ParseError {
                key: "SEARCH_SIMILARITY_THRESHOLD".to_string(),
                details: "must be between -1 and 1".to_string(),
            });
        }

        let timeout_secs: u64 = env_parse("EMBEDDING_TIMEOUT_SECS", "10")?;

        Ok(Self {
            similarity_threshold,
            embedding_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
