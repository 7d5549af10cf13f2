use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_submissions::SubmissionError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Invalid '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("User not found")]
    NotFound,

    #[error("User with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email not verified")]
    EmailNotVerified,

    #[error("Email already verified")]
    EmailAlreadyVerified,

    #[error("Invalid verification token")]
    InvalidVerificationToken,

    #[error("Verification token expired")]
    VerificationTokenExpired,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Email error: {0}")]
    Email(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<DbErr> for UserError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => UserError::DuplicateEmail(detail),
            _ => UserError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Lookups made on behalf of the submission gate
impl From<UserError> for SubmissionError {
    fn from(err: UserError) -> Self {
        SubmissionError::Internal(err.to_string())
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Validation { field, message } => AppError::field(field, message),
            UserError::NotFound => AppError::NotFound("User not found".to_string()),
            UserError::DuplicateEmail(_) => {
                AppError::Conflict("Email already registered".to_string())
            }
            UserError::InvalidCredentials => {
                AppError::Unauthorized("Invalid email or password".to_string())
            }
            UserError::EmailNotVerified => AppError::Unauthorized(
                "Please verify your email before logging in".to_string(),
            ),
            UserError::EmailAlreadyVerified => {
                AppError::BadRequest("Email address has already been verified".to_string())
            }
            UserError::InvalidVerificationToken => {
                AppError::BadRequest("Invalid verification token".to_string())
            }
            UserError::VerificationTokenExpired => AppError::BadRequest(
                "Verification token has expired. Please request a new one.".to_string(),
            ),
            UserError::Email(msg) => {
                tracing::error!(error = %msg, "Email delivery failed");
                AppError::BadGateway("Failed to send email. Please try again later.".to_string())
            }
            UserError::PasswordHash(msg) | UserError::Internal(msg) => {
                AppError::InternalServerError(msg)
            }
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
