//! UUID path parameter extractor.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

/// Extractor for a single UUID path parameter.
///
/// ```ignore
/// async fn moderate(UuidPath(id): UuidPath) -> String {
///     format!("record {id}")
/// }
///
/// let app = Router::new().route("/submissions/{id}/moderate", patch(moderate));
/// ```
pub struct UuidPath(pub Uuid);

impl<S> FromRequestParts<S> for UuidPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        Uuid::parse_str(&raw).map(UuidPath).map_err(AppError::from)
    }
}
