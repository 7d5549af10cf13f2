//! Clubs Domain
//!
//! Club directory with user submissions and moderator review.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints (public list, submit, moderation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Verification gate, field checks, name pre-check
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← In-memory or Postgres; atomic pending-only moderation
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_clubs::{handlers, InMemoryClubRepository, ClubService};
//! use domain_submissions::InMemoryIdentityVerifier;
//! use std::sync::Arc;
//!
//! let service = ClubService::new(
//!     InMemoryClubRepository::new(),
//!     Arc::new(InMemoryIdentityVerifier::new()),
//! );
//! let router: axum::Router = handlers::router(service);
//! ```

pub mod entity;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use handlers::ApiDoc;
pub use models::{Club, ClubFilter, ClubList, ClubSubmission, NewClub, PublicClub, SubmitClub};
pub use postgres::PgClubRepository;
pub use repository::{ClubRepository, InMemoryClubRepository};
pub use service::ClubService;
