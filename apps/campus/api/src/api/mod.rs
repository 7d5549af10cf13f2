pub mod health;

use crate::openapi::ApiDoc;
use crate::state::AppState;
use axum::{Router, middleware, routing::get};
use axum_helpers::{optional_jwt_auth_middleware, server::health_router};
use blob_store::LocalBlobStore;
use domain_clubs::{ClubService, PgClubRepository};
use domain_events::{EventService, PgEventRepository};
use domain_notifications::provider_from_config;
use domain_submissions::IdentityVerifier;
use domain_users::{PgUserRepository, UserService};
use domain_vector::{EmbeddingModel, EmbeddingService, OpenAIProvider};
use std::sync::Arc;
use tower_http::services::ServeDir;

/// Create all API routes
///
/// Every request passes through the optional token check, so handlers see
/// `JwtClaims` whenever a valid bearer token or `access_token` cookie was sent.
pub fn routes(state: &AppState) -> Router {
    let config = &state.config;

    let users = UserService::new(
        PgUserRepository::new(state.db.clone()),
        provider_from_config(config.email.clone()),
        state.jwt_auth.clone(),
        config.accounts.clone(),
    );
    let verifier: Arc<dyn IdentityVerifier> = Arc::new(users.identity_verifier());

    let embeddings = EmbeddingService::new(
        Arc::new(OpenAIProvider::new(config.openai.clone())),
        EmbeddingModel::TextEmbedding3Small,
        config.search.embedding_timeout,
    );
    let events = EventService::new(
        PgEventRepository::new(state.db.clone()),
        Arc::clone(&verifier),
        Arc::new(LocalBlobStore::new(config.media.clone())),
        embeddings,
        config.search,
    );

    let clubs = ClubService::new(PgClubRepository::new(state.db.clone()), verifier);

    Router::new()
        .nest("/auth", domain_users::handlers::router(users))
        .nest("/events", domain_events::handlers::router(events))
        .nest("/clubs", domain_clubs::handlers::router(clubs))
        .layer(middleware::from_fn_with_state(
            state.jwt_auth.clone(),
            optional_jwt_auth_middleware,
        ))
}

/// The whole server: documented API under `/api`, probes and media at the root
///
/// - /health: liveness check with app name/version
/// - /ready: readiness check against PostgreSQL
/// - /media: uploaded event and club images
pub async fn app(state: &AppState) -> std::io::Result<Router> {
    // create_router adds docs/middleware to our composed routes
    let router = axum_helpers::create_router::<ApiDoc>(routes(state)).await?;

    Ok(router
        .merge(health_router(state.config.app))
        .merge(ready_router(state.clone()))
        .nest_service("/media", ServeDir::new(&state.config.media.root)))
}

/// Readiness probe, mounted beside `/health` outside the `/api` prefix
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum_helpers::{JwtAuth, JwtConfig};
    use blob_store::BlobStoreConfig;
    use core_config::{app_info, server::ServerConfig};
    use database::postgres::PostgresConfig;
    use domain_users::AccountsConfig;
    use domain_vector::{OpenAIConfig, SearchConfig};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use tower::ServiceExt;

    fn state() -> AppState {
        let jwt = JwtConfig::new("this-is-a-valid-secret-with-32-chars!").unwrap();
        AppState {
            config: Config {
                app: app_info!(),
                database: PostgresConfig::new("postgresql://localhost/campus"),
                server: ServerConfig::default(),
                environment: Environment::Development,
                jwt: jwt.clone(),
                accounts: AccountsConfig::default(),
                openai: OpenAIConfig::new("sk-test".to_string()),
                search: SearchConfig::default(),
                email: None,
                media: BlobStoreConfig {
                    root: std::env::temp_dir().join("campus-media-test"),
                    base_url: "http://localhost:8080/media".to_string(),
                },
            },
            // No queued results, so every query fails
            db: MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            jwt_auth: JwtAuth::new(&jwt),
        }
    }

    async fn status(app: &Router, uri: &str) -> StatusCode {
        app.clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_probes_are_mounted_at_root() {
        let app = temp_env::async_with_vars(
            [("CORS_ALLOWED_ORIGIN", Some("http://localhost:5173"))],
            app(&state()),
        )
        .await
        .unwrap();

        assert_eq!(status(&app, "/health").await, StatusCode::OK);
        assert_eq!(status(&app, "/ready").await, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status(&app, "/api/health").await, StatusCode::NOT_FOUND);
    }
}
