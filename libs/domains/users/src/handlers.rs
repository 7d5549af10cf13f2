use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_helpers::{
    AuditEvent, AuditOutcome, CurrentUser, JsonBody, JwtClaims, access_token_cookie,
    expired_access_token_cookie,
    errors::responses::{
        BadGatewayResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
    extract_ip_from_headers, extract_user_agent,
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::entity;
use crate::error::{UserError, UserResult};
use crate::models::{
    EmailQuery, LoginRequest, LoginResponse, MessageResponse, RegisterRequest, RegisterResponse,
    ResendVerificationRequest, Role, UserResponse, VerificationStatus,
};
use crate::repository::UserRepository;
use crate::service::UserService;

/// OpenAPI documentation for the auth API
#[derive(OpenApi)]
#[openapi(
    paths(
        register,
        login,
        logout,
        verify_email,
        check_verification,
        resend_verification,
        me,
    ),
    components(
        schemas(
            RegisterRequest,
            RegisterResponse,
            LoginRequest,
            LoginResponse,
            UserResponse,
            Role,
            VerificationStatus,
            ResendVerificationRequest,
            MessageResponse
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            UnauthorizedResponse,
            ConflictResponse,
            BadGatewayResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = entity::Model::TAG, description = "Registration, login and email verification")
    )
)]
pub struct ApiDoc;

/// Create the auth router with all HTTP endpoints
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/verify-email/{token}", get(verify_email))
        .route("/check-verification", get(check_verification))
        .route("/resend-verification", post(resend_verification))
        .route("/me", get(me))
        .with_state(shared_service)
}

fn audit_outcome<T>(result: &UserResult<T>) -> AuditOutcome {
    match result {
        Ok(_) => AuditOutcome::Success,
        Err(UserError::InvalidCredentials | UserError::EmailNotVerified) => AuditOutcome::Denied,
        Err(_) => AuditOutcome::Failure,
    }
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/register",
    tag = entity::Model::TAG,
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created; verification email requested", body = RegisterResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn register<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    headers: HeaderMap,
    JsonBody(input): JsonBody<RegisterRequest>,
) -> UserResult<impl IntoResponse> {
    let result = service.register(input).await;

    AuditEvent::new(
        None,
        "user.register",
        result.as_ref().ok().map(|r| format!("user:{}", r.email)),
        audit_outcome(&result),
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .log();

    Ok((StatusCode::CREATED, Json(result?)))
}

/// Log in with email and password
///
/// The access token is returned in the body and as an HttpOnly cookie.
#[utoipa::path(
    post,
    path = "/login",
    tag = entity::Model::TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn login<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    headers: HeaderMap,
    JsonBody(input): JsonBody<LoginRequest>,
) -> UserResult<Response> {
    let result = service.login(input).await;

    AuditEvent::new(
        result.as_ref().ok().map(|r| r.user.id.to_string()),
        "user.login",
        None,
        audit_outcome(&result),
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .log();

    let response = result?;
    let cookie = access_token_cookie(
        &response.access_token,
        response.expires_in,
        service.secure_cookies(),
    );
    let cookie = HeaderValue::from_str(&cookie)
        .map_err(|e| UserError::Internal(format!("Failed to create cookie: {}", e)))?;

    Ok(([(header::SET_COOKIE, cookie)], Json(response)).into_response())
}

/// End a cookie session
///
/// Expires the access token cookie. Tokens held elsewhere stay valid until
/// they expire.
#[utoipa::path(
    post,
    path = "/logout",
    tag = entity::Model::TAG,
    responses(
        (status = 200, description = "Cookie cleared", body = MessageResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn logout<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    headers: HeaderMap,
    claims: Option<Extension<JwtClaims>>,
) -> UserResult<Response> {
    AuditEvent::new(
        claims.map(|Extension(c)| c.sub),
        "user.logout",
        None,
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .log();

    let cookie = HeaderValue::from_str(&expired_access_token_cookie(service.secure_cookies()))
        .map_err(|e| UserError::Internal(format!("Failed to create cookie: {}", e)))?;

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse::new("Logged out successfully")),
    )
        .into_response())
}

/// Confirm an email address from the mailed link
#[utoipa::path(
    get,
    path = "/verify-email/{token}",
    tag = entity::Model::TAG,
    params(
        ("token" = String, Path, description = "Verification token")
    ),
    responses(
        (status = 200, description = "Email verified, or already verified", body = MessageResponse),
        (status = 400, description = "Unknown or expired token"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn verify_email<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    headers: HeaderMap,
    Path(token): Path<String>,
) -> UserResult<Json<MessageResponse>> {
    let result = service.verify_email(&token).await;

    AuditEvent::new(None, "user.verify_email", None, audit_outcome(&result))
        .with_ip(extract_ip_from_headers(&headers))
        .with_user_agent(extract_user_agent(&headers))
        .with_details(json!({ "error": result.as_ref().err().map(|e| e.to_string()) }))
        .log();

    Ok(Json(result?))
}

/// Whether an account's email is verified
#[utoipa::path(
    get,
    path = "/check-verification",
    tag = entity::Model::TAG,
    params(EmailQuery),
    responses(
        (status = 200, description = "Verification status", body = VerificationStatus),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn check_verification<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Query(query): Query<EmailQuery>,
) -> UserResult<Json<VerificationStatus>> {
    Ok(Json(service.verification_status(&query.email).await?))
}

/// Send a new verification link
#[utoipa::path(
    post,
    path = "/resend-verification",
    tag = entity::Model::TAG,
    request_body = ResendVerificationRequest,
    responses(
        (status = 200, description = "Verification email sent", body = MessageResponse),
        (status = 400, description = "Email already verified"),
        (status = 404, response = NotFoundResponse),
        (status = 502, response = BadGatewayResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn resend_verification<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    JsonBody(input): JsonBody<ResendVerificationRequest>,
) -> UserResult<Json<MessageResponse>> {
    Ok(Json(service.resend_verification(&input.email).await?))
}

/// The authenticated caller's account
#[utoipa::path(
    get,
    path = "/me",
    tag = entity::Model::TAG,
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn me<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    user: CurrentUser,
) -> UserResult<Json<UserResponse>> {
    Ok(Json(service.me(user.id).await?))
}
