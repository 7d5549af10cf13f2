pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Error as UuidError;
use validator::ValidationErrors;

/// Standard error response structure.
///
/// Returned for every error response:
/// - `code`: integer error code for logging/monitoring (e.g. 1008)
/// - `error`: machine-readable identifier (e.g. "CONFLICT")
/// - `message`: human-readable message
/// - `details`: optional structured details, keyed by field for validation errors
///
/// ```json
/// {
///   "code": 1001,
///   "error": "VALIDATION_ERROR",
///   "message": "Event date must not be in the past",
///   "details": { "date": ["Event date must not be in the past"] }
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier for programmatic handling
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Optional structured error details (e.g., validation field errors)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
            details,
        }
    }
}

/// Application error type that can be converted to HTTP responses.
///
/// Domain crates convert their own errors into this type at the request
/// boundary. Variants that wrap unexpected failures log the cause and answer
/// with a generic message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON parsing error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("Validation error on '{field}': {message}")]
    FieldValidation { field: String, message: String },

    #[error("UUID error: {0}")]
    UuidError(#[from] UuidError),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unprocessable Entity: {0}")]
    UnprocessableEntity(String),

    #[error("Upstream failure: {0}")]
    BadGateway(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    /// Field-scoped validation failure, rendered as `details: { field: [message] }`.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FieldValidation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Flattens validator errors into `{ field: [{code, message, params}] }`.
pub fn validation_details(errors: &ValidationErrors) -> Value {
    let details = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<Value> = errors
                .iter()
                .map(|err| {
                    json!({
                        "code": err.code,
                        "message": err.message,
                        "params": err.params,
                    })
                })
                .collect();
            (field.to_string(), Value::Array(messages))
        })
        .collect::<serde_json::Map<_, _>>();

    Value::Object(details)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::SerdeJson(e) => {
                tracing::error!(error_code = ErrorCode::SerdeJsonError.code(), error = ?e, "JSON processing error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::SerdeJsonError,
                    ErrorCode::SerdeJsonError.default_message().to_string(),
                    None,
                )
            }
            AppError::Database(e) => map_db_error(&e),
            AppError::Io(e) => {
                tracing::error!(error_code = ErrorCode::IoError.code(), error = ?e, "I/O error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::IoError,
                    ErrorCode::IoError.default_message().to_string(),
                    None,
                )
            }
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(error_code = ErrorCode::JsonExtraction.code(), error = ?e, "JSON extraction error");
                (e.status(), ErrorCode::JsonExtraction, e.body_text(), None)
            }
            AppError::ValidationError(e) => {
                tracing::info!(error_code = ErrorCode::ValidationError.code(), error = ?e, "Validation error");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorCode::ValidationError,
                    ErrorCode::ValidationError.default_message().to_string(),
                    Some(validation_details(&e)),
                )
            }
            AppError::FieldValidation { field, message } => {
                tracing::info!(error_code = ErrorCode::ValidationError.code(), %field, %message, "Field validation error");
                let mut details = serde_json::Map::new();
                details.insert(field, json!([message.clone()]));
                (
                    StatusCode::BAD_REQUEST,
                    ErrorCode::ValidationError,
                    message,
                    Some(Value::Object(details)),
                )
            }
            AppError::UuidError(e) => {
                tracing::warn!(error_code = ErrorCode::InvalidUuid.code(), error = ?e, "UUID error");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorCode::InvalidUuid,
                    ErrorCode::InvalidUuid.default_message().to_string(),
                    None,
                )
            }
            AppError::BadRequest(msg) => {
                tracing::info!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, ErrorCode::BadRequest, msg, None)
            }
            AppError::Unauthorized(msg) => {
                tracing::info!("Unauthorized: {}", msg);
                (StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, msg, None)
            }
            AppError::Forbidden(msg) => {
                tracing::info!("Forbidden: {}", msg);
                (StatusCode::FORBIDDEN, ErrorCode::Forbidden, msg, None)
            }
            AppError::NotFound(msg) => {
                tracing::info!(error_code = ErrorCode::NotFound.code(), "Not found: {}", msg);
                (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg, None)
            }
            AppError::Conflict(msg) => {
                tracing::info!("Conflict: {}", msg);
                (StatusCode::CONFLICT, ErrorCode::Conflict, msg, None)
            }
            AppError::UnprocessableEntity(msg) => {
                tracing::info!("Unprocessable entity: {}", msg);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorCode::UnprocessableEntity,
                    msg,
                    None,
                )
            }
            AppError::BadGateway(msg) => {
                tracing::error!(error_code = ErrorCode::UpstreamFailure.code(), "Upstream failure: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorCode::UpstreamFailure,
                    ErrorCode::UpstreamFailure.default_message().to_string(),
                    None,
                )
            }
            AppError::InternalServerError(msg) => {
                tracing::error!(error_code = ErrorCode::InternalError.code(), "Internal server error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalError,
                    ErrorCode::InternalError.default_message().to_string(),
                    None,
                )
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorCode::ServiceUnavailable,
                    msg,
                    None,
                )
            }
        };

        (status, Json(ErrorResponse::new(code, message, details))).into_response()
    }
}

/// Maps a SeaORM error to response components without leaking SQL details.
fn map_db_error(error: &DbErr) -> (StatusCode, ErrorCode, String, Option<Value>) {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = error.sql_err() {
        tracing::info!(
            error_code = ErrorCode::DatabaseUniqueViolation.code(),
            %detail,
            "Unique constraint violation"
        );
        return (
            StatusCode::CONFLICT,
            ErrorCode::DatabaseUniqueViolation,
            ErrorCode::DatabaseUniqueViolation
                .default_message()
                .to_string(),
            None,
        );
    }

    match error {
        DbErr::RecordNotFound(what) => {
            tracing::info!(error_code = ErrorCode::DatabaseNotFound.code(), %what, "Record not found");
            (
                StatusCode::NOT_FOUND,
                ErrorCode::DatabaseNotFound,
                ErrorCode::DatabaseNotFound.default_message().to_string(),
                None,
            )
        }
        DbErr::ConnectionAcquire(e) => {
            tracing::error!(error_code = ErrorCode::DatabaseUnavailable.code(), error = ?e, "Database connection unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::DatabaseUnavailable,
                ErrorCode::DatabaseUnavailable.default_message().to_string(),
                None,
            )
        }
        DbErr::Migration(e) => {
            tracing::error!(error_code = ErrorCode::MigrationError.code(), error = %e, "Database migration error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::MigrationError,
                ErrorCode::MigrationError.default_message().to_string(),
                None,
            )
        }
        other => {
            tracing::error!(error_code = ErrorCode::DatabaseError.code(), error = ?other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::DatabaseError,
                ErrorCode::DatabaseError.default_message().to_string(),
                None,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(error: AppError) -> (StatusCode, ErrorResponse) {
        let response = error.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_field_validation_renders_field_details() {
        let (status, body) = body_of(AppError::field("date", "Event date must not be in the past")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, 1001);
        assert_eq!(body.error, "VALIDATION_ERROR");
        assert_eq!(
            body.details,
            Some(json!({ "date": ["Event date must not be in the past"] }))
        );
    }

    #[tokio::test]
    async fn test_internal_error_hides_cause() {
        let (status, body) =
            body_of(AppError::InternalServerError("connection string leaked".into())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.message.contains("connection string"));
        assert_eq!(body.message, ErrorCode::InternalError.default_message());
    }

    #[tokio::test]
    async fn test_bad_gateway_uses_generic_message() {
        let (status, body) = body_of(AppError::BadGateway("openai: 429".into())).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.error, "UPSTREAM_FAILURE");
        assert!(!body.message.contains("openai"));
    }

    #[tokio::test]
    async fn test_not_found_keeps_message() {
        let (status, body) = body_of(AppError::NotFound("Event not found".into())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, 1004);
        assert_eq!(body.message, "Event not found");
        assert!(body.details.is_none());
    }

    #[tokio::test]
    async fn test_record_not_found_db_error_maps_to_404() {
        let (status, body) =
            body_of(AppError::Database(DbErr::RecordNotFound("events".into()))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "DATABASE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_generic_db_error_maps_to_500() {
        let (status, body) = body_of(AppError::Database(DbErr::Custom("boom".into()))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "DATABASE_ERROR");
        assert!(!body.message.contains("boom"));
    }
}
