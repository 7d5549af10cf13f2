use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum_helpers::JwtAuth;
use chrono::Utc;
use domain_notifications::{EmailContent, EmailProvider, verification_email};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::ValidateEmail;

use crate::config::AccountsConfig;
use crate::error::{UserError, UserResult};
use crate::models::{
    LoginRequest, LoginResponse, MessageResponse, RegisterRequest, RegisterResponse, Role, User,
    UserResponse, VERIFICATION_TOKEN_TTL_HOURS, VerificationStatus, normalize_email,
    validate_password,
};
use crate::repository::UserRepository;
use crate::verifier::AccountIdentityVerifier;

/// Service layer for registration, login and email verification
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    emails: Arc<dyn EmailProvider>,
    jwt: JwtAuth,
    config: AccountsConfig,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(
        repository: R,
        emails: Arc<dyn EmailProvider>,
        jwt: JwtAuth,
        config: AccountsConfig,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            emails,
            jwt,
            config,
        }
    }

    /// Verification gate for submissions, reading the same accounts
    pub fn identity_verifier(&self) -> AccountIdentityVerifier<R> {
        AccountIdentityVerifier::new(Arc::clone(&self.repository))
    }

    pub fn secure_cookies(&self) -> bool {
        self.config.secure_cookies
    }

    /// Create an unverified account and mail its verification link.
    ///
    /// Delivery failure keeps the account; the response reports it.
    #[instrument(skip(self, input))]
    pub async fn register(&self, input: RegisterRequest) -> UserResult<RegisterResponse> {
        let email = self.validate_email(&input.email)?;
        validate_password(&input.password)?;

        if self.repository.get_by_email(&email).await?.is_some() {
            return Err(UserError::DuplicateEmail(email));
        }

        let role = if self.config.is_admin_email(&email) {
            Role::Moderator
        } else {
            Role::User
        };
        let password_hash = hash_password(&input.password)?;
        let user = self
            .repository
            .create(User::new(email, password_hash, role, Utc::now()))
            .await?;

        let verification_email_sent = match self.send_verification(&user).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Verification email not sent");
                false
            }
        };

        let message = if verification_email_sent {
            "User created successfully. Please check your email to verify your account."
        } else {
            "User created, but the verification email could not be sent. Please request a new one."
        };

        Ok(RegisterResponse {
            message: message.to_string(),
            email: user.email,
            email_verified: false,
            verification_email_sent,
        })
    }

    /// Check credentials and issue an access token for verified accounts
    pub async fn login(&self, input: LoginRequest) -> UserResult<LoginResponse> {
        let email = normalize_email(&input.email);
        let user = self
            .repository
            .get_by_email(&email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(UserError::InvalidCredentials);
        }
        if !user.email_verified {
            return Err(UserError::EmailNotVerified);
        }

        let issued = self
            .jwt
            .create_access_token(user.id, &user.email, &user.role.claims())
            .map_err(|e| {
                tracing::error!(error = ?e, "Failed to create access token");
                UserError::Internal("Failed to create token".to_string())
            })?;

        Ok(LoginResponse {
            message: "Login successful".to_string(),
            user: user.into(),
            access_token: issued.token,
            token_type: "Bearer".to_string(),
            expires_in: issued.expires_in,
        })
    }

    /// Consume a verification token
    pub async fn verify_email(&self, token: &str) -> UserResult<MessageResponse> {
        let mut user = self
            .repository
            .get_by_verification_token(token)
            .await?
            .ok_or(UserError::InvalidVerificationToken)?;

        let now = Utc::now();
        if user.verification_token_expired(now) {
            return Err(UserError::VerificationTokenExpired);
        }
        if user.email_verified {
            return Ok(MessageResponse::new("Email already verified"));
        }

        user.mark_verified(now);
        self.repository.update_verification(&user).await?;

        tracing::info!(user_id = %user.id, "Email verified");
        Ok(MessageResponse::new("Email verified successfully"))
    }

    pub async fn verification_status(&self, email: &str) -> UserResult<VerificationStatus> {
        let user = self
            .repository
            .get_by_email(&normalize_email(email))
            .await?
            .ok_or(UserError::NotFound)?;

        Ok(VerificationStatus {
            email: user.email,
            email_verified: user.email_verified,
        })
    }

    /// Issue a fresh token and mail it again
    #[instrument(skip(self))]
    pub async fn resend_verification(&self, email: &str) -> UserResult<MessageResponse> {
        let mut user = self
            .repository
            .get_by_email(&normalize_email(email))
            .await?
            .ok_or(UserError::NotFound)?;

        if user.email_verified {
            return Err(UserError::EmailAlreadyVerified);
        }

        user.reissue_verification_token(Utc::now());
        self.repository.update_verification(&user).await?;
        self.send_verification(&user).await?;

        Ok(MessageResponse::new(
            "Verification email sent. Please check your inbox.",
        ))
    }

    /// Profile of the authenticated caller
    pub async fn me(&self, user_id: Uuid) -> UserResult<UserResponse> {
        let user = self
            .repository
            .get_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound)?;
        Ok(user.into())
    }

    fn validate_email(&self, raw: &str) -> UserResult<String> {
        let email = normalize_email(raw);
        if email.is_empty() {
            return Err(UserError::validation("email", "Email is required"));
        }
        if email.len() > 255 || !email.validate_email() {
            return Err(UserError::validation("email", "Enter a valid email address"));
        }
        if !self.config.allows_email(&email) {
            let domain = self.config.allowed_email_domain.as_deref().unwrap_or_default();
            return Err(UserError::validation(
                "email",
                format!("Email must be a valid @{} address", domain),
            ));
        }
        Ok(email)
    }

    async fn send_verification(&self, user: &User) -> UserResult<()> {
        let token = user
            .verification_token
            .as_deref()
            .ok_or_else(|| UserError::Internal("No verification token issued".to_string()))?;
        let link = self.config.verification_link(token);

        let rendered = verification_email(&link, VERIFICATION_TOKEN_TTL_HOURS)
            .map_err(|e| UserError::Email(e.to_string()))?;
        let sent = self
            .emails
            .send(&EmailContent {
                to_email: user.email.clone(),
                subject: rendered.subject,
                html_body: rendered.html,
                text_body: rendered.text,
            })
            .await
            .map_err(|e| UserError::Email(e.to_string()))?;

        if !sent.accepted {
            return Err(UserError::Email(format!(
                "{} did not accept the message",
                self.emails.name()
            )));
        }

        tracing::info!(
            user_id = %user.id,
            provider = self.emails.name(),
            message_id = ?sent.message_id,
            "Verification email sent"
        );
        Ok(())
    }
}

// Password helpers

fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
