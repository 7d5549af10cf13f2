//! Handler-side access to the authenticated identity.

use super::jwt::JwtClaims;
use crate::errors::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// Role granting access to moderation endpoints
pub const MODERATOR_ROLE: &str = "moderator";

/// Authenticated caller, decoded from the claims placed by the auth middleware.
///
/// Rejects with 401 when no valid token accompanied the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub roles: Vec<String>,
}

impl CurrentUser {
    pub fn is_moderator(&self) -> bool {
        self.roles.iter().any(|role| role == MODERATOR_ROLE)
    }
}

impl TryFrom<&JwtClaims> for CurrentUser {
    type Error = AppError;

    fn try_from(claims: &JwtClaims) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))?;

        Ok(Self {
            id,
            email: claims.email.clone(),
            roles: claims.roles.clone(),
        })
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<JwtClaims>()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        CurrentUser::try_from(claims)
    }
}

/// Authenticated caller holding the moderator role; 403 otherwise.
#[derive(Debug, Clone)]
pub struct ModeratorUser(pub CurrentUser);

impl<S> FromRequestParts<S> for ModeratorUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        if !user.is_moderator() {
            tracing::info!(user_id = %user.id, "Moderator role required");
            return Err(AppError::Forbidden(
                "Moderator privileges required".to_string(),
            ));
        }

        Ok(ModeratorUser(user))
    }
}
