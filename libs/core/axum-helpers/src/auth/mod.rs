//! Stateless JWT authentication.
//!
//! - [`JwtAuth`] issues and verifies HS256 access tokens
//! - [`jwt_auth_middleware`] / [`optional_jwt_auth_middleware`] place
//!   [`JwtClaims`] into request extensions
//! - [`CurrentUser`] / [`ModeratorUser`] read those claims inside handlers
//!
//! ```ignore
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//!
//! let api = Router::new()
//!     .nest("/events", events_router)
//!     .layer(axum::middleware::from_fn_with_state(auth, optional_jwt_auth_middleware));
//! ```

pub mod config;
pub mod extractors;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use extractors::{CurrentUser, MODERATOR_ROLE, ModeratorUser};
pub use jwt::{IssuedToken, JwtAuth, JwtClaims};
pub use middleware::{
    ACCESS_TOKEN_COOKIE, access_token_cookie, expired_access_token_cookie, jwt_auth_middleware,
    optional_jwt_auth_middleware,
};
