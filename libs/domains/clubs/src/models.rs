use chrono::{DateTime, Utc};
use domain_submissions::{
    ClubType, ModerationState, Moderatable, SubmissionResult, SubmissionStatus,
    contains_ignore_case, first_field_error, non_blank, require_text,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Club record with its moderation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Club {
    pub id: Uuid,
    pub club_name: String,
    pub categories: String,
    pub club_page: Option<String>,
    pub ig: Option<String>,
    pub discord: Option<String>,
    pub club_type: Option<ClubType>,
    #[serde(flatten)]
    pub moderation: ModerationState,
}

impl Moderatable for Club {
    fn record_id(&self) -> Uuid {
        self.id
    }

    fn moderation(&self) -> &ModerationState {
        &self.moderation
    }

    fn moderation_mut(&mut self) -> &mut ModerationState {
        &mut self.moderation
    }
}

impl Club {
    /// A freshly submitted club, awaiting review
    pub fn submitted(input: NewClub, submitted_by: Uuid, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            club_name: input.club_name,
            categories: input.categories,
            club_page: input.club_page,
            ig: input.ig,
            discord: input.discord,
            club_type: input.club_type,
            moderation: ModerationState::submitted(submitted_by, at),
        }
    }

    /// Whether `name` collides with this club's name under the visibility rule
    pub fn claims_name(&self, name: &str) -> bool {
        self.is_publicly_visible() && self.club_name.to_lowercase() == name.to_lowercase()
    }
}

/// Club as shown to the public
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PublicClub {
    pub id: Uuid,
    pub club_name: String,
    pub categories: String,
    pub club_page: Option<String>,
    pub ig: Option<String>,
    pub discord: Option<String>,
    pub club_type: Option<ClubType>,
}

impl From<Club> for PublicClub {
    fn from(club: Club) -> Self {
        Self {
            id: club.id,
            club_name: club.club_name,
            categories: club.categories,
            club_page: club.club_page,
            ig: club.ig,
            discord: club.discord,
            club_type: club.club_type,
        }
    }
}

/// Public listing envelope
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClubList {
    pub clubs: Vec<PublicClub>,
}

/// Club as shown to its submitter and to moderators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClubSubmission {
    pub id: Uuid,
    pub club_name: String,
    pub categories: String,
    pub club_page: Option<String>,
    pub ig: Option<String>,
    pub discord: Option<String>,
    pub club_type: Option<ClubType>,
    pub status: SubmissionStatus,
    pub submitted_by: Option<Uuid>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

impl From<Club> for ClubSubmission {
    fn from(club: Club) -> Self {
        let ModerationState {
            status,
            submitted_by,
            submitted_at,
            reviewed_by,
            reviewed_at,
            rejection_reason,
        } = club.moderation;

        Self {
            id: club.id,
            club_name: club.club_name,
            categories: club.categories,
            club_page: club.club_page,
            ig: club.ig,
            discord: club.discord,
            club_type: club.club_type,
            status,
            submitted_by,
            submitted_at,
            reviewed_by,
            reviewed_at,
            rejection_reason,
        }
    }
}

/// Club submission payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmitClub {
    #[serde(default)]
    #[validate(length(max = 100, message = "Club name must be at most 100 characters"))]
    pub club_name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255, message = "Categories must be at most 255 characters"))]
    pub categories: Option<String>,
    #[serde(default)]
    #[validate(url(message = "Enter a valid URL"))]
    pub club_page: Option<String>,
    #[serde(default)]
    #[validate(url(message = "Enter a valid URL"))]
    pub ig: Option<String>,
    #[serde(default)]
    #[validate(url(message = "Enter a valid URL"))]
    pub discord: Option<String>,
    #[serde(default)]
    pub club_type: Option<ClubType>,
}

const FIELD_ORDER: &[&str] = &["club_name", "categories", "club_page", "ig", "discord"];

impl SubmitClub {
    /// Field checks in submission order: required text first, then formats.
    pub fn into_new_club(self) -> SubmissionResult<NewClub> {
        let club_name = require_text("club_name", self.club_name.as_deref())?;
        let categories = require_text("categories", self.categories.as_deref())?;

        let normalized = SubmitClub {
            club_name: Some(club_name.clone()),
            categories: Some(categories.clone()),
            club_page: optional_text(self.club_page),
            ig: optional_text(self.ig),
            discord: optional_text(self.discord),
            club_type: self.club_type,
        };
        normalized
            .validate()
            .map_err(|e| first_field_error(&e, FIELD_ORDER))?;

        Ok(NewClub {
            club_name,
            categories,
            club_page: normalized.club_page,
            ig: normalized.ig,
            discord: normalized.discord,
            club_type: normalized.club_type,
        })
    }
}

fn optional_text(value: Option<String>) -> Option<String> {
    non_blank(value.as_deref()).map(str::to_string)
}

/// Validated, trimmed club ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewClub {
    pub club_name: String,
    pub categories: String,
    pub club_page: Option<String>,
    pub ig: Option<String>,
    pub discord: Option<String>,
    pub club_type: Option<ClubType>,
}

/// Public listing filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ClubFilter {
    /// Case-insensitive substring of the club name
    pub search: Option<String>,
    /// Case-insensitive substring of the categories; `all` disables the filter
    pub category: Option<String>,
    pub club_type: Option<ClubType>,
}

impl ClubFilter {
    pub fn search_term(&self) -> Option<&str> {
        non_blank(self.search.as_deref())
    }

    pub fn category_term(&self) -> Option<&str> {
        non_blank(self.category.as_deref()).filter(|c| !c.eq_ignore_ascii_case("all"))
    }

    pub fn matches(&self, club: &Club) -> bool {
        if let Some(search) = self.search_term() {
            if !contains_ignore_case(&club.club_name, search) {
                return false;
            }
        }
        if let Some(category) = self.category_term() {
            if !contains_ignore_case(&club.categories, category) {
                return false;
            }
        }
        if let Some(club_type) = self.club_type {
            if club.club_type != Some(club_type) {
                return false;
            }
        }
        true
    }
}
