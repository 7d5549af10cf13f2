//! JSON extractor whose rejections use the standard error body.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;

/// Like `Json<T>`, but malformed bodies render as [`AppError`].
///
/// Field checks are left to the service so they run after its own
/// preconditions.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        name: Option<String>,
    }

    fn request(body: &'static str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_accepts_missing_optional_fields() {
        let JsonBody(payload) = JsonBody::<Payload>::from_request(request("{}"), &())
            .await
            .unwrap();
        assert!(payload.name.is_none());
    }

    #[tokio::test]
    async fn test_malformed_body_is_app_error() {
        let result = JsonBody::<Payload>::from_request(request("{not json"), &()).await;
        assert!(matches!(result, Err(AppError::JsonExtractorRejection(_))));
    }
}
