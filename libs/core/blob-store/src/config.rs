use core_config::{ConfigError, FromEnv, env_optional, env_or_default};
use std::path::PathBuf;

/// Local media storage settings.
///
/// - `MEDIA_ROOT` (default: `./media`)
/// - `MEDIA_BASE_URL` (default: `{PUBLIC_BASE_URL}/media`)
#[derive(Debug, Clone)]
pub struct BlobStoreConfig {
    pub root: PathBuf,
    pub base_url: String,
}

impl FromEnv for BlobStoreConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let root = PathBuf::from(env_or_default("MEDIA_ROOT", "./media"));
        let base_url = env_optional("MEDIA_BASE_URL").unwrap_or_else(|| {
            let public = env_or_default("PUBLIC_BASE_URL", "http://localhost:8080");
            format!("{}/media", public.trim_end_matches('/'))
        });

        Ok(Self {
            root,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}
