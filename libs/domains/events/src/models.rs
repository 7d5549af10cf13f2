use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use domain_submissions::{
    ClubType, ModerationState, Moderatable, SubmissionError, SubmissionResult, SubmissionStatus,
    non_blank, require_text,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Image formats accepted for event posters
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Event record with its moderation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub club_handle: Option<String>,
    pub url: Option<String>,
    pub name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub location: String,
    pub price: Option<f64>,
    pub food: Option<String>,
    pub registration: bool,
    pub image_url: Option<String>,
    pub description: Option<String>,
    /// Description embedding, never exposed through the API
    pub embedding: Option<Vec<f32>>,
    pub added_at: DateTime<Utc>,
    pub club_type: Option<ClubType>,
    pub reactions: Value,
    /// Internal notes, never exposed through the API
    pub notes: Option<String>,
    #[serde(flatten)]
    pub moderation: ModerationState,
}

impl Moderatable for Event {
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

impl Event {
    /// A freshly submitted event, awaiting review
    pub fn submitted(
        input: NewEvent,
        image_url: String,
        embedding: Option<Vec<f32>>,
        submitted_by: Uuid,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            club_handle: input.club_handle,
            url: input.url,
            name: input.name,
            date: input.date,
            start_time: input.start_time,
            end_time: Some(input.end_time),
            location: input.location,
            price: input.price,
            food: input.food,
            registration: input.registration,
            image_url: Some(image_url),
            description: input.description,
            embedding,
            added_at: at,
            club_type: input.club_type,
            reactions: Value::Object(Default::default()),
            notes: None,
            moderation: ModerationState::submitted(submitted_by, at),
        }
    }

    /// Price used by range filters; a missing price means free
    pub fn effective_price(&self) -> f64 {
        self.price.unwrap_or(0.0)
    }

    /// Public listing order: date, then start time, then id
    pub fn natural_order(a: &Event, b: &Event) -> Ordering {
        a.date
            .cmp(&b.date)
            .then_with(|| a.start_time.cmp(&b.start_time))
            .then_with(|| a.id.cmp(&b.id))
    }
}

/// Event as shown to the public
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PublicEvent {
    pub id: Uuid,
    pub club_handle: Option<String>,
    pub url: Option<String>,
    pub name: String,
    pub date: NaiveDate,
    #[schema(value_type = String, example = "18:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = Option<String>, example = "20:00:00")]
    pub end_time: Option<NaiveTime>,
    pub location: String,
    pub price: Option<f64>,
    pub food: Option<String>,
    pub registration: bool,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub club_type: Option<ClubType>,
    pub added_at: DateTime<Utc>,
}

impl From<Event> for PublicEvent {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            club_handle: event.club_handle,
            url: event.url,
            name: event.name,
            date: event.date,
            start_time: event.start_time,
            end_time: event.end_time,
            location: event.location,
            price: event.price,
            food: event.food,
            registration: event.registration,
            image_url: event.image_url,
            description: event.description,
            club_type: event.club_type,
            added_at: event.added_at,
        }
    }
}

/// Event as shown to its submitter and to moderators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EventSubmission {
    #[serde(flatten)]
    pub event: PublicEvent,
    pub status: SubmissionStatus,
    pub submitted_by: Option<Uuid>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

impl From<Event> for EventSubmission {
    fn from(mut event: Event) -> Self {
        let ModerationState {
            status,
            submitted_by,
            submitted_at,
            reviewed_by,
            reviewed_at,
            rejection_reason,
        } = std::mem::replace(&mut event.moderation, ModerationState::scraped());

        Self {
            event: event.into(),
            status,
            submitted_by,
            submitted_at,
            reviewed_by,
            reviewed_at,
            rejection_reason,
        }
    }
}

/// Uploaded image part of a submission
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageUpload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Allowed extension taken from the filename, else from the content type.
    pub fn extension(&self) -> Option<&'static str> {
        if let Some(ext) = self
            .filename
            .as_deref()
            .filter(|name| name.contains('.'))
            .and_then(|name| name.rsplit('.').next())
        {
            let ext = ext.to_lowercase();
            return IMAGE_EXTENSIONS.iter().copied().find(|allowed| *allowed == ext);
        }

        match self.content_type.as_deref()? {
            "image/jpeg" | "image/jpg" => Some("jpg"),
            "image/png" => Some("png"),
            "image/gif" => Some("gif"),
            "image/webp" => Some("webp"),
            _ => None,
        }
    }
}

/// Raw multipart submission: text fields by name plus the image part
#[derive(Debug, Clone, Default)]
pub struct EventForm {
    fields: HashMap<String, String>,
    image: Option<ImageUpload>,
}

/// Image that passed validation, ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedImage {
    pub bytes: Vec<u8>,
    pub extension: &'static str,
    pub content_type: String,
}

impl ValidatedImage {
    pub fn storage_path(&self, key: Uuid) -> String {
        format!("events/submitted/{}.{}", key, self.extension)
    }
}

/// Validated, trimmed event ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub club_handle: Option<String>,
    pub url: Option<String>,
    pub name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: String,
    pub price: Option<f64>,
    pub food: Option<String>,
    pub registration: bool,
    pub description: Option<String>,
    pub club_type: Option<ClubType>,
}

impl EventForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_field(name, value);
        self
    }

    pub fn with_image(mut self, image: ImageUpload) -> Self {
        self.image = Some(image);
        self
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn set_image(&mut self, image: ImageUpload) {
        self.image = Some(image);
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    fn optional(&self, name: &str) -> Option<String> {
        non_blank(self.field(name)).map(str::to_string)
    }

    /// Field checks in submission order: required text, parsing, date and
    /// time invariants, then the image. First failure wins.
    pub fn validate(self, today: NaiveDate) -> SubmissionResult<(NewEvent, ValidatedImage)> {
        let name = require_text("name", self.field("name"))?;
        let location = require_text("location", self.field("location"))?;

        let date = parse_date(&require_text("date", self.field("date"))?)?;
        let start_time = parse_time("start_time", &require_text("start_time", self.field("start_time"))?)?;
        let end_time = parse_time("end_time", &require_text("end_time", self.field("end_time"))?)?;
        let price = self.optional("price").map(|p| parse_price(&p)).transpose()?;
        let registration = self
            .optional("registration")
            .map(|r| parse_flag(&r))
            .transpose()?
            .unwrap_or(false);
        let club_type = self
            .optional("club_type")
            .map(|t| {
                t.parse::<ClubType>().map_err(|_| {
                    SubmissionError::validation(
                        "club_type",
                        "Club type must be one of: WUSA, Athletics, Student Society",
                    )
                })
            })
            .transpose()?;

        if date < today {
            return Err(SubmissionError::validation("date", "Event date must be in the future"));
        }
        if end_time <= start_time {
            return Err(SubmissionError::validation(
                "end_time",
                "End time must be after start time",
            ));
        }

        let image = self
            .image
            .as_ref()
            .filter(|image| !image.bytes.is_empty())
            .ok_or_else(|| SubmissionError::validation("image", "An event image is required"))?;
        let extension = image.extension().ok_or_else(|| {
            SubmissionError::validation("image", "Image must be a JPG, PNG, GIF or WEBP file")
        })?;
        let content_type = image
            .content_type
            .clone()
            .filter(|ct| ct.starts_with("image/"))
            .unwrap_or_else(|| content_type_for(extension).to_string());

        let new_event = NewEvent {
            club_handle: self.optional("club_handle"),
            url: self.optional("url"),
            name,
            date,
            start_time,
            end_time,
            location,
            price,
            food: self.optional("food"),
            registration,
            description: self.optional("description"),
            club_type,
        };

        let image = ValidatedImage {
            bytes: self.image.map(|image| image.bytes).unwrap_or_default(),
            extension,
            content_type,
        };

        Ok((new_event, image))
    }
}

fn parse_date(value: &str) -> SubmissionResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| SubmissionError::validation("date", "Enter a valid date (YYYY-MM-DD)"))
}

fn parse_time(field: &str, value: &str) -> SubmissionResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| SubmissionError::validation(field, "Enter a valid time (HH:MM)"))
}

fn parse_price(value: &str) -> SubmissionResult<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price >= 0.0)
        .ok_or_else(|| SubmissionError::validation("price", "Price must be a non-negative number"))
}

fn parse_flag(value: &str) -> SubmissionResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        _ => Err(SubmissionError::validation(
            "registration",
            "Registration must be true or false",
        )),
    }
}

fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}

/// Multipart body of an event submission (documentation only)
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct SubmitEventForm {
    name: String,
    location: String,
    #[schema(example = "2026-11-20")]
    date: String,
    #[schema(example = "18:00")]
    start_time: String,
    #[schema(example = "20:00")]
    end_time: String,
    price: Option<f64>,
    food: Option<String>,
    registration: Option<bool>,
    description: Option<String>,
    url: Option<String>,
    club_handle: Option<String>,
    club_type: Option<ClubType>,
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

/// Public listing filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct EventFilter {
    /// Free-text query, ranked by semantic similarity
    pub search: Option<String>,
    /// Earliest event date, inclusive
    pub start_date: Option<NaiveDate>,
    /// Latest event date, inclusive
    pub end_date: Option<NaiveDate>,
    /// Minimum price; events without a price count as free
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub club_type: Option<ClubType>,
}

impl EventFilter {
    pub fn validate(&self) -> SubmissionResult<()> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(SubmissionError::validation(
                    "start_date",
                    "start_date must be on or before end_date",
                ));
            }
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(SubmissionError::validation(
                    "min_price",
                    "min_price must not exceed max_price",
                ));
            }
        }
        Ok(())
    }

    pub fn search_term(&self) -> Option<&str> {
        non_blank(self.search.as_deref())
    }

    /// Structured filters only; the text query is applied by ranking.
    pub fn matches(&self, event: &Event) -> bool {
        if self.start_date.is_some_and(|start| event.date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| event.date > end) {
            return false;
        }
        if self.min_price.is_some_and(|min| event.effective_price() < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| event.effective_price() > max) {
            return false;
        }
        if let Some(club_type) = self.club_type {
            if event.club_type != Some(club_type) {
                return false;
            }
        }
        true
    }
}

/// Similarity probe parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SimilarityParams {
    /// Text to compare against event descriptions
    pub q: Option<String>,
    /// Minimum cosine similarity (default 0.25)
    pub threshold: Option<f32>,
    pub limit: Option<usize>,
    /// Skip events dated before this day (`YYYY-MM-DD`)
    pub min_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SimilarEvent {
    pub id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub similarity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SimilarityResponse {
    pub search_query: String,
    pub threshold: f32,
    pub limit: Option<usize>,
    pub min_date: Option<NaiveDate>,
    pub results: Vec<SimilarEvent>,
}

/// `ids` query parameter shared by the calendar exports
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CalendarQuery {
    /// Comma-separated event ids
    pub ids: Option<String>,
}

impl CalendarQuery {
    pub fn parse_ids(&self) -> SubmissionResult<Vec<Uuid>> {
        let raw = non_blank(self.ids.as_deref())
            .ok_or_else(|| SubmissionError::validation("ids", "Missing required query parameter: ids"))?;

        let ids = raw
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| {
                Uuid::parse_str(id).map_err(|_| {
                    SubmissionError::validation("ids", "ids must be a comma-separated list of UUIDs")
                })
            })
            .collect::<SubmissionResult<Vec<_>>>()?;

        if ids.is_empty() {
            return Err(SubmissionError::validation("ids", "No valid event IDs provided"));
        }
        Ok(ids)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CalendarUrls {
    pub urls: Vec<String>,
}
