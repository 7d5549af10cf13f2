use chrono::{DateTime, Duration, Utc};
use rand::{Rng, distr::Alphanumeric};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{UserError, UserResult};

/// Verification links stay valid this long
pub const VERIFICATION_TOKEN_TTL_HOURS: i64 = 24;

pub const VERIFICATION_TOKEN_LEN: usize = 64;

const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Account role
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    #[default]
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "moderator")]
    Moderator,
}

impl Role {
    /// Role names carried in access tokens
    pub fn claims(self) -> Vec<String> {
        match self {
            Role::User => vec![Role::User.to_string()],
            Role::Moderator => vec![Role::User.to_string(), Role::Moderator.to_string()],
        }
    }
}

/// Account record
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub role: Role,
    pub email_verified: bool,
    pub verification_token: Option<String>,
    pub verification_token_created_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Unverified account holding a fresh verification token
    pub fn new(email: String, password_hash: String, role: Role, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            email,
            password_hash,
            role,
            email_verified: false,
            verification_token: Some(generate_verification_token()),
            verification_token_created_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the verification token, returning the new one
    pub fn reissue_verification_token(&mut self, now: DateTime<Utc>) -> String {
        let token = generate_verification_token();
        self.verification_token = Some(token.clone());
        self.verification_token_created_at = Some(now);
        self.updated_at = now;
        token
    }

    pub fn verification_token_expired(&self, now: DateTime<Utc>) -> bool {
        self.verification_token_created_at
            .is_some_and(|issued| now - issued > Duration::hours(VERIFICATION_TOKEN_TTL_HOURS))
    }

    pub fn mark_verified(&mut self, now: DateTime<Utc>) {
        self.email_verified = true;
        self.verification_token = None;
        self.verification_token_created_at = None;
        self.updated_at = now;
    }
}

/// Random alphanumeric token for verification links
pub fn generate_verification_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(VERIFICATION_TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// 8 to 128 characters mixing upper case, lower case, digits and symbols
pub fn validate_password(password: &str) -> UserResult<()> {
    let length = password.chars().count();
    let rule = if length < 8 {
        Some("Password must be at least 8 characters")
    } else if length > 128 {
        Some("Password cannot exceed 128 characters")
    } else if !password.chars().any(char::is_uppercase) {
        Some("Password must contain at least one uppercase letter")
    } else if !password.chars().any(char::is_lowercase) {
        Some("Password must contain at least one lowercase letter")
    } else if !password.chars().any(|c| c.is_ascii_digit()) {
        Some("Password must contain at least one digit")
    } else if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
        Some("Password must contain at least one special character (!@#$%^&*()_+-=[]{}|;:,.<>?)")
    } else {
        None
    };

    match rule {
        Some(message) => Err(UserError::validation("password", message)),
        None => Ok(()),
    }
}

/// Lookup key for accounts: trimmed and lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Account as shown to its owner
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            email_verified: user.email_verified,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "someone@uwaterloo.ca")]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub email: String,
    pub email_verified: bool,
    /// False when the verification email could not be delivered; a resend can be requested
    pub verification_email_sent: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserResponse,
    pub access_token: String,
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerificationStatus {
    pub email: String,
    pub email_verified: bool,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ResendVerificationRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_token_shape() {
        let token = generate_verification_token();
        assert_eq!(token.len(), VERIFICATION_TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, generate_verification_token());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("Str0ng!pass").is_ok());

        for weak in ["Sh0rt!", "alllower1!", "ALLUPPER1!", "NoDigits!!", "NoSymbol12"] {
            let err = validate_password(weak).unwrap_err();
            assert!(matches!(err, UserError::Validation { ref field, .. } if field == "password"));
        }

        let too_long = format!("Aa1!{}", "x".repeat(125));
        assert!(validate_password(&too_long).is_err());
    }

    #[test]
    fn test_token_expiry_window() {
        let now = Utc::now();
        let mut user = User::new("a@uwaterloo.ca".into(), "hash".into(), Role::User, now);

        assert!(!user.verification_token_expired(now + Duration::hours(23)));
        assert!(user.verification_token_expired(now + Duration::hours(25)));

        user.mark_verified(now);
        assert!(user.email_verified);
        assert!(user.verification_token.is_none());
        assert!(!user.verification_token_expired(now + Duration::days(30)));
    }

    #[test]
    fn test_moderator_claims_include_user() {
        assert_eq!(Role::User.claims(), vec!["user"]);
        assert_eq!(Role::Moderator.claims(), vec!["user", "moderator"]);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@UWaterloo.CA "), "ada@uwaterloo.ca");
    }
}
