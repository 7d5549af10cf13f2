//! Events Domain
//!
//! Campus event listings with user submissions, moderator review, semantic
//! search and calendar export.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints (list, search, export, multipart submit, moderation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐      ┌──────────────────┐
//! │   Service   │─────►│ EmbeddingService │  query and description vectors
//! └──────┬──────┘      └──────────────────┘
//!        │             ┌──────────────────┐
//!        ├────────────►│    BlobStore     │  event images
//!        │             └──────────────────┘
//! ┌──────▼──────┐
//! │ Repository  │  ← In-memory or Postgres; atomic pending-only moderation
//! └─────────────┘
//! ```
//!
//! # Search
//!
//! Public listing starts from visible events (approved or scraped), applies
//! the date, price and club type filters, then, when a text query is present,
//! keeps only events whose description embedding scores at or above the
//! similarity threshold, ordered by score.

pub mod calendar;
pub mod entity;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use handlers::ApiDoc;
pub use models::{
    CalendarQuery, CalendarUrls, Event, EventFilter, EventForm, EventSubmission, ImageUpload,
    NewEvent, PublicEvent, SimilarityParams, SimilarityResponse,
};
pub use postgres::PgEventRepository;
pub use repository::{EventRepository, InMemoryEventRepository};
pub use service::EventService;
