use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, patch, post},
};
use axum_helpers::{
    AppError, AuditEvent, AuditOutcome, CurrentUser, JsonBody, ModeratorUser, UuidPath,
    errors::responses::{
        BadGatewayResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
    extract_ip_from_headers, extract_user_agent,
};
use domain_submissions::{
    BulkModerationRequest, BulkModerationResult, ClubType, ModerationRequest, SubmissionResult,
    SubmissionStatus,
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::entity;
use crate::models::{
    CalendarQuery, CalendarUrls, EventFilter, EventForm, EventSubmission, ImageUpload,
    PublicEvent, SimilarEvent, SimilarityParams, SimilarityResponse, SubmitEventForm,
};
use crate::repository::EventRepository;
use crate::service::EventService;

/// Upper bound for a multipart submission, image included
pub const MAX_SUBMISSION_BYTES: usize = 10 * 1024 * 1024;

/// OpenAPI documentation for Events API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_events,
        similarity,
        export_ics,
        google_calendar_urls,
        submit_event,
        my_submissions,
        pending_submissions,
        moderate_event,
        bulk_moderate_events,
    ),
    components(
        schemas(
            PublicEvent,
            EventSubmission,
            SubmitEventForm,
            SimilarEvent,
            SimilarityResponse,
            CalendarUrls,
            ClubType,
            SubmissionStatus,
            ModerationRequest,
            BulkModerationRequest,
            BulkModerationResult
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            BadGatewayResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = entity::Model::TAG, description = "Event listing, search, export, submission and moderation")
    )
)]
pub struct ApiDoc;

/// Create the event router with all HTTP endpoints
pub fn router<R: EventRepository + 'static>(service: EventService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_events))
        .route("/similarity", get(similarity))
        .route("/export.ics", get(export_ics))
        .route("/google-calendar-urls", get(google_calendar_urls))
        .route(
            "/submit",
            post(submit_event).layer(DefaultBodyLimit::max(MAX_SUBMISSION_BYTES)),
        )
        .route("/submissions", get(my_submissions))
        .route("/submissions/pending", get(pending_submissions))
        .route("/submissions/{id}/moderate", patch(moderate_event))
        .route("/submissions/bulk-moderate", post(bulk_moderate_events))
        .with_state(shared_service)
}

/// List publicly visible events, optionally ranked by a text query
#[utoipa::path(
    get,
    path = "",
    tag = entity::Model::TAG,
    params(EventFilter),
    responses(
        (status = 200, description = "Visible events, by date or by similarity when searching", body = Vec<PublicEvent>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 502, response = BadGatewayResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_events<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    Query(filter): Query<EventFilter>,
) -> SubmissionResult<Json<Vec<PublicEvent>>> {
    Ok(Json(service.list_public(filter).await?))
}

/// Similarity scores of visible events for a query
#[utoipa::path(
    get,
    path = "/similarity",
    tag = entity::Model::TAG,
    params(SimilarityParams),
    responses(
        (status = 200, description = "Events above the threshold, best first", body = SimilarityResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 502, response = BadGatewayResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn similarity<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    Query(params): Query<SimilarityParams>,
) -> SubmissionResult<Json<SimilarityResponse>> {
    Ok(Json(service.similar(params).await?))
}

/// Export events as an iCalendar file
#[utoipa::path(
    get,
    path = "/export.ics",
    tag = entity::Model::TAG,
    params(CalendarQuery),
    responses(
        (status = 200, description = "Calendar file", content_type = "text/calendar", body = String),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn export_ics<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    Query(query): Query<CalendarQuery>,
) -> SubmissionResult<impl IntoResponse> {
    let ics = service.export_ics(query).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"events.ics\""),
            (header::CACHE_CONTROL, "private, max-age=0, must-revalidate"),
        ],
        ics,
    ))
}

/// Google Calendar links for events
#[utoipa::path(
    get,
    path = "/google-calendar-urls",
    tag = entity::Model::TAG,
    params(CalendarQuery),
    responses(
        (status = 200, description = "One link per event", body = CalendarUrls),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn google_calendar_urls<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    Query(query): Query<CalendarQuery>,
) -> SubmissionResult<Json<CalendarUrls>> {
    Ok(Json(service.google_calendar_urls(query).await?))
}

/// Collects the multipart parts into a form; values are validated later.
async fn read_form(mut multipart: Multipart) -> Result<EventForm, AppError> {
    let mut form = EventForm::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "image" {
            let filename = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            form.set_image(ImageUpload {
                filename,
                content_type,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            form.set_field(name, value);
        }
    }

    Ok(form)
}

/// Submit an event for review
#[utoipa::path(
    post,
    path = "/submit",
    tag = entity::Model::TAG,
    request_body(content = SubmitEventForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Event submitted and pending review", body = EventSubmission),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 502, response = BadGatewayResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn submit_event<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    user: CurrentUser,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_form(multipart).await?;
    let result = service.submit(user.id, form).await;

    let mut audit = AuditEvent::new(
        Some(user.id.to_string()),
        "event.submit",
        result.as_ref().ok().map(|e| format!("event:{}", e.event.id)),
        if result.is_ok() {
            AuditOutcome::Success
        } else {
            AuditOutcome::Failure
        },
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers));
    if let Err(err) = &result {
        audit = audit.with_details(json!({ "error": err.to_string() }));
    }
    audit.log();

    Ok((StatusCode::CREATED, Json(result?)))
}

/// The caller's event submissions, newest first
#[utoipa::path(
    get,
    path = "/submissions",
    tag = entity::Model::TAG,
    responses(
        (status = 200, description = "Own submissions", body = Vec<EventSubmission>),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn my_submissions<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    user: CurrentUser,
) -> SubmissionResult<Json<Vec<EventSubmission>>> {
    Ok(Json(service.list_submitted_by(user.id).await?))
}

/// Moderation queue, oldest first
#[utoipa::path(
    get,
    path = "/submissions/pending",
    tag = entity::Model::TAG,
    responses(
        (status = 200, description = "Pending submissions", body = Vec<EventSubmission>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn pending_submissions<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    ModeratorUser(_moderator): ModeratorUser,
) -> SubmissionResult<Json<Vec<EventSubmission>>> {
    Ok(Json(service.list_pending().await?))
}

/// Approve or reject a pending event
#[utoipa::path(
    patch,
    path = "/submissions/{id}/moderate",
    tag = entity::Model::TAG,
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    request_body = ModerationRequest,
    responses(
        (status = 200, description = "Event moderated", body = EventSubmission),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn moderate_event<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    ModeratorUser(moderator): ModeratorUser,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
    JsonBody(request): JsonBody<ModerationRequest>,
) -> SubmissionResult<Json<EventSubmission>> {
    let requested = request.status;
    let result = service.moderate(id, moderator.id, request).await;

    AuditEvent::new(
        Some(moderator.id.to_string()),
        "event.moderate",
        Some(format!("event:{}", id)),
        if result.is_ok() {
            AuditOutcome::Success
        } else {
            AuditOutcome::Failure
        },
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .with_details(json!({ "status": requested }))
    .log();

    Ok(Json(result?))
}

/// Administrative bulk approve/reject, regardless of current status
#[utoipa::path(
    post,
    path = "/submissions/bulk-moderate",
    tag = entity::Model::TAG,
    request_body = BulkModerationRequest,
    responses(
        (status = 200, description = "Events updated", body = BulkModerationResult),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn bulk_moderate_events<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    ModeratorUser(moderator): ModeratorUser,
    headers: HeaderMap,
    JsonBody(request): JsonBody<BulkModerationRequest>,
) -> SubmissionResult<Json<BulkModerationResult>> {
    let details = json!({ "status": request.status, "ids": request.ids });
    let result = service.bulk_moderate(moderator.id, request).await?;

    AuditEvent::new(
        Some(moderator.id.to_string()),
        "event.bulk_moderate",
        None,
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .with_details(json!({ "request": details, "updated": result.updated }))
    .log();

    Ok(Json(result))
}
