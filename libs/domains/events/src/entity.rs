use domain_submissions::{ClubType, ModerationState, SubmissionStatus};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

use crate::models::Event;

/// Sea-ORM Entity for the events table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub club_handle: Option<String>,
    pub url: Option<String>,
    pub name: String,
    pub date: Date,
    pub start_time: Time,
    pub end_time: Option<Time>,
    pub location: String,
    #[sea_orm(column_type = "Double", nullable)]
    pub price: Option<f64>,
    pub food: Option<String>,
    pub registration: bool,
    pub image_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub embedding: Option<Json>,
    pub added_at: DateTimeWithTimeZone,
    pub club_type: Option<ClubType>,
    #[sea_orm(column_type = "JsonBinary")]
    pub reactions: Json,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub status: SubmissionStatus,
    pub submitted_by: Option<Uuid>,
    pub submitted_at: Option<DateTimeWithTimeZone>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Text", nullable)]
    pub rejection_reason: Option<String>,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub const TAG: &'static str = "events";
}

fn decode_embedding(id: Uuid, value: Json) -> Option<Vec<f32>> {
    serde_json::from_value(value)
        .inspect_err(|e| tracing::warn!(event_id = %id, error = %e, "Ignoring malformed embedding"))
        .ok()
}

// Conversion from Sea-ORM Model to domain Event
impl From<Model> for Event {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            club_handle: model.club_handle,
            url: model.url,
            name: model.name,
            date: model.date,
            start_time: model.start_time,
            end_time: model.end_time,
            location: model.location,
            price: model.price,
            food: model.food,
            registration: model.registration,
            image_url: model.image_url,
            description: model.description,
            embedding: model.embedding.and_then(|v| decode_embedding(model.id, v)),
            added_at: model.added_at.into(),
            club_type: model.club_type,
            reactions: model.reactions,
            notes: model.notes,
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

// New rows; updated_at comes from the column default
impl From<&Event> for ActiveModel {
    fn from(event: &Event) -> Self {
        ActiveModel {
            id: Set(event.id),
            club_handle: Set(event.club_handle.clone()),
            url: Set(event.url.clone()),
            name: Set(event.name.clone()),
            date: Set(event.date),
            start_time: Set(event.start_time),
            end_time: Set(event.end_time),
            location: Set(event.location.clone()),
            price: Set(event.price),
            food: Set(event.food.clone()),
            registration: Set(event.registration),
            image_url: Set(event.image_url.clone()),
            description: Set(event.description.clone()),
            embedding: Set(event.embedding.clone().map(Json::from)),
            added_at: Set(event.added_at.into()),
            club_type: Set(event.club_type),
            reactions: Set(event.reactions.clone()),
            notes: Set(event.notes.clone()),
            submitted_by: Set(event.moderation.submitted_by),
            submitted_at: Set(event.moderation.submitted_at.map(Into::into)),
            updated_at: NotSet,
            ..review_columns(&event.moderation)
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
