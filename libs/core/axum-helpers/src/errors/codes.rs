//! Type-safe error codes for API responses.
//!
//! Each code carries a string identifier for clients, an integer for logs and
//! dashboards, and a default message used when the real cause must not leak.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standardized error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request validation failed
    ValidationError,
    /// Invalid UUID format in path or query parameter
    InvalidUuid,
    /// JSON extraction from request body failed
    JsonExtraction,
    /// Requested resource was not found
    NotFound,
    /// An unexpected internal server error occurred
    InternalError,
    /// Authentication credentials are missing or invalid
    Unauthorized,
    /// Authenticated user lacks sufficient permissions
    Forbidden,
    /// Request conflicts with current resource state
    Conflict,
    /// Request payload is semantically incorrect
    UnprocessableEntity,
    /// Invalid JSON format in request body
    InvalidJson,
    /// Service is temporarily unavailable
    ServiceUnavailable,
    /// An upstream dependency (embedding, storage, email) failed
    UpstreamFailure,
    /// Malformed request that is not a field validation failure
    BadRequest,

    // Database errors (2000-2999)
    /// Database connection or query error
    DatabaseError,
    /// Database query returned no results
    DatabaseNotFound,
    /// Unique constraint rejected the write
    DatabaseUniqueViolation,
    /// Database connection pool is exhausted or closed
    DatabaseUnavailable,

    // Migration errors (3000s)
    /// Database migration failed
    MigrationError,

    // I/O errors (4000s)
    /// File system I/O error
    IoError,

    // JSON errors (5000s)
    /// JSON serialization/deserialization error
    SerdeJsonError,
}

impl ErrorCode {
    /// SCREAMING_SNAKE_CASE identifier for programmatic handling by clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidUuid => "INVALID_UUID",
            Self::JsonExtraction => "JSON_EXTRACTION",
            Self::NotFound => "NOT_FOUND",
            Self::InternalError => "INTERNAL_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Conflict => "CONFLICT",
            Self::UnprocessableEntity => "UNPROCESSABLE_ENTITY",
            Self::InvalidJson => "INVALID_JSON",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::UpstreamFailure => "UPSTREAM_FAILURE",
            Self::BadRequest => "BAD_REQUEST",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::DatabaseNotFound => "DATABASE_NOT_FOUND",
            Self::DatabaseUniqueViolation => "DATABASE_UNIQUE_VIOLATION",
            Self::DatabaseUnavailable => "DATABASE_UNAVAILABLE",
            Self::MigrationError => "MIGRATION_ERROR",
            Self::IoError => "IO_ERROR",
            Self::SerdeJsonError => "SERDE_JSON_ERROR",
        }
    }

    /// Integer code for logging and monitoring.
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidUuid => 1002,
            Self::JsonExtraction => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::Unauthorized => 1006,
            Self::Forbidden => 1007,
            Self::Conflict => 1008,
            Self::UnprocessableEntity => 1009,
            Self::InvalidJson => 1010,
            Self::ServiceUnavailable => 1011,
            Self::UpstreamFailure => 1012,
            Self::BadRequest => 1013,
            Self::DatabaseError => 2001,
            Self::DatabaseNotFound => 2002,
            Self::DatabaseUniqueViolation => 2003,
            Self::DatabaseUnavailable => 2004,
            Self::MigrationError => 3001,
            Self::IoError => 4001,
            Self::SerdeJsonError => 5001,
        }
    }

    /// Default human-readable message.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidUuid => "Invalid UUID format",
            Self::JsonExtraction => "Failed to extract JSON from request body",
            Self::NotFound => "Resource not found",
            Self::InternalError => "An internal server error occurred",
            Self::Unauthorized => "Authentication required",
            Self::Forbidden => "Access forbidden",
            Self::Conflict => "Resource already exists",
            Self::UnprocessableEntity => "Request payload is semantically incorrect",
            Self::InvalidJson => "Invalid JSON format",
            Self::ServiceUnavailable => "Service is temporarily unavailable",
            Self::UpstreamFailure => "An upstream service failed, please try again later",
            Self::BadRequest => "Bad request",
            Self::DatabaseError => "A database error occurred",
            Self::DatabaseNotFound => "Requested record was not found",
            Self::DatabaseUniqueViolation => "Resource already exists",
            Self::DatabaseUnavailable => "Database is temporarily unavailable",
            Self::MigrationError => "Database migration error",
            Self::IoError => "An I/O error occurred",
            Self::SerdeJsonError => "Failed to process JSON data",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
