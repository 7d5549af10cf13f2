//! Application state management.
//!
//! Shared state handed to route builders: configuration, the PostgreSQL
//! pool and the token issuer.

use axum_helpers::JwtAuth;

/// Shared application state.
///
/// Cloning is cheap: the connection pool and keys are reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// PostgreSQL database connection pool
    pub db: database::postgres::DatabaseConnection,
    /// Issues and verifies access tokens
    pub jwt_auth: JwtAuth,
}
