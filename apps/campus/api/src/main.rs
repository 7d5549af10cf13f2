use axum_helpers::server::create_production_app;
use core_config::tracing::{init_tracing, install_color_eyre};
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // A local .env is optional; real environment variables win
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    database::postgres::run_migrations::<migration::Migrator>(&db, config.app.name)
        .await
        .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;

    tokio::fs::create_dir_all(&config.media.root)
        .await
        .map_err(|e| eyre::eyre!("Cannot create media root {:?}: {}", config.media.root, e))?;

    let jwt_auth = axum_helpers::JwtAuth::new(&config.jwt);

    let state = AppState {
        config,
        db,
        jwt_auth,
    };

    let app = api::app(&state).await?;

    let shutdown_timeout = Duration::from_secs(state.config.server.shutdown_timeout_secs);
    info!(
        "Starting {} with graceful shutdown ({:?} timeout)",
        state.config.app.name, shutdown_timeout
    );

    let server = state.config.server.clone();
    let db = state.db.clone();
    drop(state);

    create_production_app(app, &server, shutdown_timeout, async move {
        info!("Shutting down: closing database connections");
        match db.close().await {
            Ok(_) => info!("PostgreSQL connection closed successfully"),
            Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Campus API shutdown complete");
    Ok(())
}
