use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VectorError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Embedding has {actual} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding request timed out after {0}s")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type VectorResult<T> = Result<T, VectorError>;

impl From<reqwest::Error> for VectorError {
    fn from(err: reqwest::Error) -> Self {
        VectorError::Embedding(err.to_string())
    }
}

/// Convert VectorError to AppError for standardized HTTP error responses
impl From<VectorError> for AppError {
    fn from(err: VectorError) -> Self {
        match err {
            VectorError::Validation(msg) => AppError::BadRequest(msg),
            VectorError::Config(msg) => {
                AppError::InternalServerError(format!("Config error: {}", msg))
            }
            upstream => AppError::BadGateway(upstream.to_string()),
        }
    }
}

impl IntoResponse for VectorError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
