use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Invalid '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("A verified email address is required")]
    VerificationRequired,

    #[error("Record {0} not found or not pending")]
    NotFoundOrWrongState(Uuid),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Image upload failed")]
    UploadFailed,

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type SubmissionResult<T> = Result<T, SubmissionError>;

impl SubmissionError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Field name for validation failures
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<DbErr> for SubmissionError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => SubmissionError::Conflict(detail),
            _ => SubmissionError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert SubmissionError to AppError for standardized error responses
impl From<SubmissionError> for AppError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Validation { field, message } => AppError::field(field, message),
            SubmissionError::VerificationRequired => AppError::Forbidden(
                "Please verify your email address before submitting".to_string(),
            ),
            SubmissionError::NotFoundOrWrongState(_) => {
                AppError::NotFound("Submission not found or not pending".to_string())
            }
            SubmissionError::NotFound(msg) => AppError::NotFound(msg),
            SubmissionError::UploadFailed => AppError::BadGateway("image upload failed".to_string()),
            SubmissionError::Embedding(msg) => AppError::BadGateway(format!("embedding: {}", msg)),
            SubmissionError::Conflict(msg) => AppError::Conflict(msg),
            SubmissionError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for SubmissionError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
