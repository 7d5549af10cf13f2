use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
};
use axum_helpers::{
    AuditEvent, AuditOutcome, CurrentUser, JsonBody, ModeratorUser, UuidPath,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
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
use crate::models::{ClubFilter, ClubList, ClubSubmission, PublicClub, SubmitClub};
use crate::repository::ClubRepository;
use crate::service::ClubService;

/// OpenAPI documentation for Clubs API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_clubs,
        submit_club,
        my_submissions,
        pending_submissions,
        moderate_club,
        bulk_moderate_clubs,
    ),
    components(
        schemas(
            PublicClub,
            ClubList,
            ClubSubmission,
            SubmitClub,
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
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = entity::Model::TAG, description = "Club listing, submission and moderation")
    )
)]
pub struct ApiDoc;

/// Create the club router with all HTTP endpoints
pub fn router<R: ClubRepository + 'static>(service: ClubService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_clubs))
        .route("/submit", post(submit_club))
        .route("/submissions", get(my_submissions))
        .route("/submissions/pending", get(pending_submissions))
        .route("/submissions/{id}/moderate", patch(moderate_club))
        .route("/submissions/bulk-moderate", post(bulk_moderate_clubs))
        .with_state(shared_service)
}

/// List publicly visible clubs
#[utoipa::path(
    get,
    path = "",
    tag = entity::Model::TAG,
    params(ClubFilter),
    responses(
        (status = 200, description = "Visible clubs ordered by name", body = ClubList),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_clubs<R: ClubRepository>(
    State(service): State<Arc<ClubService<R>>>,
    Query(filter): Query<ClubFilter>,
) -> SubmissionResult<Json<ClubList>> {
    let clubs = service.list_public(filter).await?;
    Ok(Json(ClubList { clubs }))
}

/// Submit a club for review
#[utoipa::path(
    post,
    path = "/submit",
    tag = entity::Model::TAG,
    request_body = SubmitClub,
    responses(
        (status = 201, description = "Club submitted and pending review", body = ClubSubmission),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn submit_club<R: ClubRepository>(
    State(service): State<Arc<ClubService<R>>>,
    user: CurrentUser,
    headers: HeaderMap,
    JsonBody(input): JsonBody<SubmitClub>,
) -> SubmissionResult<impl IntoResponse> {
    let club = service.submit(user.id, input).await?;

    AuditEvent::new(
        Some(user.id.to_string()),
        "club.submit",
        Some(format!("club:{}", club.id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .with_details(json!({ "club_name": club.club_name }))
    .log();

    Ok((StatusCode::CREATED, Json(club)))
}

/// The caller's club submissions, newest first
#[utoipa::path(
    get,
    path = "/submissions",
    tag = entity::Model::TAG,
    responses(
        (status = 200, description = "Own submissions", body = Vec<ClubSubmission>),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn my_submissions<R: ClubRepository>(
    State(service): State<Arc<ClubService<R>>>,
    user: CurrentUser,
) -> SubmissionResult<Json<Vec<ClubSubmission>>> {
    Ok(Json(service.list_submitted_by(user.id).await?))
}

/// Moderation queue, oldest first
#[utoipa::path(
    get,
    path = "/submissions/pending",
    tag = entity::Model::TAG,
    responses(
        (status = 200, description = "Pending submissions", body = Vec<ClubSubmission>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn pending_submissions<R: ClubRepository>(
    State(service): State<Arc<ClubService<R>>>,
    ModeratorUser(_moderator): ModeratorUser,
) -> SubmissionResult<Json<Vec<ClubSubmission>>> {
    Ok(Json(service.list_pending().await?))
}

/// Approve or reject a pending club
#[utoipa::path(
    patch,
    path = "/submissions/{id}/moderate",
    tag = entity::Model::TAG,
    params(
        ("id" = Uuid, Path, description = "Club ID")
    ),
    request_body = ModerationRequest,
    responses(
        (status = 200, description = "Club moderated", body = ClubSubmission),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn moderate_club<R: ClubRepository>(
    State(service): State<Arc<ClubService<R>>>,
    ModeratorUser(moderator): ModeratorUser,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
    JsonBody(request): JsonBody<ModerationRequest>,
) -> SubmissionResult<Json<ClubSubmission>> {
    let requested = request.status;
    let result = service.moderate(id, moderator.id, request).await;

    AuditEvent::new(
        Some(moderator.id.to_string()),
        "club.moderate",
        Some(format!("club:{}", id)),
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
        (status = 200, description = "Clubs updated", body = BulkModerationResult),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn bulk_moderate_clubs<R: ClubRepository>(
    State(service): State<Arc<ClubService<R>>>,
    ModeratorUser(moderator): ModeratorUser,
    headers: HeaderMap,
    JsonBody(request): JsonBody<BulkModerationRequest>,
) -> SubmissionResult<Json<BulkModerationResult>> {
    let details = json!({ "status": request.status, "ids": request.ids });
    let result = service.bulk_moderate(moderator.id, request).await?;

    AuditEvent::new(
        Some(moderator.id.to_string()),
        "club.bulk_moderate",
        None,
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .with_details(json!({ "request": details, "updated": result.updated }))
    .log();

    Ok(Json(result))
}
