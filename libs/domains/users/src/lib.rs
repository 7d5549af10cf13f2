//! Users Domain
//!
//! Accounts for the people who submit and moderate records.
//!
//! # Features
//!
//! - Registration with Argon2 password hashing and an optional email domain restriction
//! - Email verification through mailed, expiring links
//! - Login issuing HS256 access tokens (body and HttpOnly cookie)
//! - Moderator role for addresses listed in `ADMIN_EMAILS`
//! - [`AccountIdentityVerifier`], the verification gate used by submissions
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints under /auth
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐      ┌────────────────┐
//! │   Service   │ ───► │ EmailProvider  │
//! └──────┬──────┘      └────────────────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← In-memory or PostgreSQL
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_users::{AccountsConfig, InMemoryUserRepository, UserService, handlers};
//!
//! let service = UserService::new(InMemoryUserRepository::new(), emails, jwt, AccountsConfig::default());
//! let verifier = service.identity_verifier();
//! let router = handlers::router(service);
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod verifier;

// Re-export commonly used types
pub use config::AccountsConfig;
pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{
    LoginRequest, LoginResponse, MessageResponse, RegisterRequest, RegisterResponse, Role, User,
    UserResponse, VerificationStatus,
};
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
pub use verifier::AccountIdentityVerifier;
