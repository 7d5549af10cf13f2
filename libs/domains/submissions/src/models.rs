use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{SubmissionError, SubmissionResult};

/// Lifecycle status shared by every submittable record
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "submission_status")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubmissionStatus {
    /// Ingested by a trusted automated source
    #[sea_orm(string_value = "scraped")]
    Scraped,
    /// Awaiting review
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Visible to the submitter only
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl SubmissionStatus {
    pub const PUBLIC: [SubmissionStatus; 2] = [SubmissionStatus::Approved, SubmissionStatus::Scraped];

    pub fn is_publicly_visible(self) -> bool {
        Self::PUBLIC.contains(&self)
    }
}

/// Affiliation of a club, shared by club and event records
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "club_type")]
pub enum ClubType {
    #[sea_orm(string_value = "WUSA")]
    #[serde(rename = "WUSA")]
    #[strum(serialize = "WUSA")]
    Wusa,
    #[sea_orm(string_value = "Athletics")]
    Athletics,
    #[sea_orm(string_value = "Student Society")]
    #[serde(rename = "Student Society")]
    #[strum(serialize = "Student Society")]
    StudentSociety,
}

/// Submission and review audit trail embedded in each record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ModerationState {
    pub status: SubmissionStatus,
    pub submitted_by: Option<Uuid>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

impl ModerationState {
    /// State of a record created by automated ingestion
    pub fn scraped() -> Self {
        Self {
            status: SubmissionStatus::Scraped,
            submitted_by: None,
            submitted_at: None,
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
        }
    }

    /// State of a freshly submitted record
    pub fn submitted(by: Uuid, at: DateTime<Utc>) -> Self {
        Self {
            status: SubmissionStatus::Pending,
            submitted_by: Some(by),
            submitted_at: Some(at),
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
        }
    }

    pub(crate) fn record_review(
        &mut self,
        decision: &ModerationDecision,
        moderator: Uuid,
        at: DateTime<Utc>,
    ) {
        self.status = decision.target_status();
        self.reviewed_by = Some(moderator);
        self.reviewed_at = Some(at);
        if let ModerationDecision::Reject { reason } = decision {
            self.rejection_reason = Some(reason.clone());
        }
    }
}

/// A validated moderation outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationDecision {
    Approve,
    Reject { reason: String },
}

impl ModerationDecision {
    pub fn target_status(&self) -> SubmissionStatus {
        match self {
            ModerationDecision::Approve => SubmissionStatus::Approved,
            ModerationDecision::Reject { .. } => SubmissionStatus::Rejected,
        }
    }

    /// Validates a requested status and optional reason.
    pub fn parse(status: SubmissionStatus, rejection_reason: Option<&str>) -> SubmissionResult<Self> {
        match status {
            SubmissionStatus::Approved => Ok(ModerationDecision::Approve),
            SubmissionStatus::Rejected => {
                let reason = rejection_reason.map(str::trim).unwrap_or_default();
                if reason.is_empty() {
                    return Err(SubmissionError::validation(
                        "rejection_reason",
                        "Rejection reason is required when rejecting",
                    ));
                }
                Ok(ModerationDecision::Reject {
                    reason: reason.to_string(),
                })
            }
            other => Err(SubmissionError::validation(
                "status",
                format!("Status must be 'approved' or 'rejected', got '{}'", other),
            )),
        }
    }
}

/// Body of a single moderation call
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ModerationRequest {
    pub status: SubmissionStatus,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

impl TryFrom<ModerationRequest> for ModerationDecision {
    type Error = SubmissionError;

    fn try_from(request: ModerationRequest) -> Result<Self, Self::Error> {
        ModerationDecision::parse(request.status, request.rejection_reason.as_deref())
    }
}

/// Body of an administrative bulk override
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct BulkModerationRequest {
    pub ids: Vec<Uuid>,
    pub status: SubmissionStatus,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

impl BulkModerationRequest {
    pub fn decision(&self) -> SubmissionResult<ModerationDecision> {
        if self.ids.is_empty() {
            return Err(SubmissionError::validation("ids", "At least one id is required"));
        }
        ModerationDecision::parse(self.status, self.rejection_reason.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkModerationResult {
    /// Number of records changed
    pub updated: u64,
}

/// Which records a caller may see, and in which order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordScope {
    /// Approved and scraped records, natural order
    Public,
    /// The caller's own submissions, newest first
    SubmittedBy(Uuid),
    /// Pending records, oldest first
    ModerationQueue,
}

impl RecordScope {
    pub fn statuses(&self) -> &'static [SubmissionStatus] {
        match self {
            RecordScope::Public => &SubmissionStatus::PUBLIC,
            RecordScope::SubmittedBy(_) => &[
                SubmissionStatus::Pending,
                SubmissionStatus::Approved,
                SubmissionStatus::Rejected,
            ],
            RecordScope::ModerationQueue => &[SubmissionStatus::Pending],
        }
    }

    pub fn admits(&self, state: &ModerationState) -> bool {
        if !self.statuses().contains(&state.status) {
            return false;
        }
        match self {
            RecordScope::SubmittedBy(owner) => state.submitted_by == Some(*owner),
            _ => true,
        }
    }

    /// Submission-time ordering for the owner and moderator views; `None` for
    /// the public view, which uses each record type's natural order.
    pub fn submission_order(&self, a: &ModerationState, b: &ModerationState) -> Option<Ordering> {
        match self {
            RecordScope::Public => None,
            RecordScope::SubmittedBy(_) => Some(b.submitted_at.cmp(&a.submitted_at)),
            RecordScope::ModerationQueue => Some(a.submitted_at.cmp(&b.submitted_at)),
        }
    }
}
