use axum_helpers::JwtConfig;
use blob_store::BlobStoreConfig;
use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use domain_notifications::ResendConfig;
use domain_users::AccountsConfig;
use domain_vector::{OpenAIConfig, SearchConfig};

// Import database configs from the database library
use database::postgres::PostgresConfig;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Application-specific configuration
/// Composes shared config components from the libraries
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    pub jwt: JwtConfig,
    pub accounts: AccountsConfig,
    pub openai: OpenAIConfig,
    pub search: SearchConfig,
    /// `None` disables outgoing email
    pub email: Option<ResendConfig>,
    pub media: BlobStoreConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?; // Required - will fail if not set
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=8080
        let jwt = JwtConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            database,
            server,
            environment,
            jwt,
            accounts: AccountsConfig::from_env()?,
            openai: OpenAIConfig::from_env()?,
            search: SearchConfig::from_env()?,
            email: ResendConfig::from_env()?,
            media: BlobStoreConfig::from_env()?,
        })
    }
}
