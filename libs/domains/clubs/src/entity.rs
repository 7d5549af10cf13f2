use domain_submissions::{ClubType, ModerationState, SubmissionStatus};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

use crate::models::Club;

/// Sea-ORM Entity for the clubs table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "clubs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub club_name: String,
    #[sea_orm(column_type = "Text")]
    pub categories: String,
    pub club_page: Option<String>,
    pub ig: Option<String>,
    pub discord: Option<String>,
    pub club_type: Option<ClubType>,
    pub status: SubmissionStatus,
    pub submitted_by: Option<Uuid>,
    pub submitted_at: Option<DateTimeWithTimeZone>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Text", nullable)]
    pub rejection_reason: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub const TAG: &'static str = "clubs";
}

// Conversion from Sea-ORM Model to domain Club
impl From<Model> for Club {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            club_name: model.club_name,
            categories: model.categories,
            club_page: model.club_page,
            ig: model.ig,
            discord: model.discord,
            club_type: model.club_type,
            moderation: ModerationState {
                status: model.status,
                submitted_by: model.submitted_by,
                submitted_at: model.submitted_at.map(Into::into),
                reviewed_by: model.reviewed_by,
                reviewed_at: model.reviewed_at.map(Into::into),
                rejection_reason: model.rejection_reason,
            },
        }
    }
}

// New rows; created_at/updated_at come from column defaults
impl From<&Club> for ActiveModel {
    fn from(club: &Club) -> Self {
        ActiveModel {
            id: Set(club.id),
            club_name: Set(club.club_name.clone()),
            categories: Set(club.categories.clone()),
            club_page: Set(club.club_page.clone()),
            ig: Set(club.ig.clone()),
            discord: Set(club.discord.clone()),
            club_type: Set(club.club_type),
            submitted_by: Set(club.moderation.submitted_by),
            submitted_at: Set(club.moderation.submitted_at.map(Into::into)),
            created_at: NotSet,
            updated_at: NotSet,
            ..review_columns(&club.moderation)
        }
    }
}

/// Active model touching only the status and review columns
pub fn review_columns(state: &ModerationState) -> ActiveModel {
    ActiveModel {
        status: Set(state.status),
        reviewed_by: Set(state.reviewed_by),
        reviewed_at: Set(state.reviewed_at.map(Into::into)),
        rejection_reason: Set(state.rejection_reason.clone()),
        ..Default::default()
    }
}
