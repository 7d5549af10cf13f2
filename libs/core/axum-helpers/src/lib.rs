//! # Axum Helpers
//!
//! Shared building blocks for the campus HTTP services.
//!
//! ## Modules
//!
//! - **[`auth`]**: stateless JWT authentication and identity extractors
//! - **[`server`]**: router assembly, health checks, graceful shutdown
//! - **[`http`]**: HTTP middleware (CORS, security headers)
//! - **[`errors`]**: structured error responses with error codes
//! - **[`extractors`]**: custom extractors (UUID path, JSON bodies)
//! - **[`audit`]**: audit logging for moderation and account actions
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::server::{create_app, create_router};
//! use core_config::server::ServerConfig;
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api_routes = Router::new(); // Add your routes
//!     let router = create_router::<ApiDoc>(api_routes).await?;
//!
//!     let config = ServerConfig::default();
//!     create_app(router, &config).await?;
//!     Ok(())
//! }
//! ```

pub mod audit;
pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

// Re-export auth types
pub use auth::{
    ACCESS_TOKEN_COOKIE, CurrentUser, IssuedToken, JwtAuth, JwtClaims, JwtConfig, MODERATOR_ROLE,
    ModeratorUser, access_token_cookie, expired_access_token_cookie, jwt_auth_middleware,
    optional_jwt_auth_middleware,
};

// Re-export server types
pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_app, create_production_app,
    create_router, health_router, run_health_checks, shutdown_signal,
};

// Re-export HTTP middleware
pub use http::{allowed_origins_from_env, create_cors_layer, security_headers};

// Re-export error types
pub use errors::{AppError, ErrorCode, ErrorResponse};

// Re-export extractors
pub use extractors::{JsonBody, UuidPath};

// Re-export audit types
pub use audit::{AuditEvent, AuditOutcome, extract_ip_from_headers, extract_user_agent};
