//! Submissions Domain
//!
//! Shared moderation lifecycle for user-submitted records (events, clubs).
//!
//! ```text
//!   scraped ───────────────────────────────► publicly visible
//!   pending ──approve──► approved ─────────► publicly visible
//!          └──reject───► rejected ─────────► submitter only
//! ```
//!
//! - [`Moderatable`]: capability composed into each record type
//! - [`RecordScope`]: the public, owner and moderation-queue views
//! - [`IdentityVerifier`]: verified-email gate consulted before any submission
//! - [`SubmissionError`]: error taxonomy shared by every submission flow

pub mod error;
pub mod filter;
pub mod identity;
pub mod models;
pub mod moderation;
pub mod validation;

pub use error::{SubmissionError, SubmissionResult};
pub use filter::{contains_ignore_case, like_contains_pattern, non_blank};
pub use identity::{IdentityVerifier, InMemoryIdentityVerifier, require_verified};
pub use models::{
    BulkModerationRequest, BulkModerationResult, ClubType, ModerationDecision, ModerationRequest,
    ModerationState, RecordScope, SubmissionStatus,
};
pub use moderation::Moderatable;
pub use validation::{first_field_error, require_text};
