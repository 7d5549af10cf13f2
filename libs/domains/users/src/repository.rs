use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::User;

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user; an existing email is `DuplicateEmail`
    async fn create(&self, user: User) -> UserResult<User>;

    /// Get a user by ID
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Get a user by normalized email
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// Get the user holding a verification token
    async fn get_by_verification_token(&self, token: &str) -> UserResult<Option<User>>;

    /// Persist the verification flag and token columns
    async fn update_verification(&self, user: &User) -> UserResult<()>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn get_by_verification_token(&self, token: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.verification_token.as_deref() == Some(token))
            .cloned())
    }

    async fn update_verification(&self, user: &User) -> UserResult<()> {
        let mut users = self.users.write().await;
        let stored = users.get_mut(&user.id).ok_or(UserError::NotFound)?;

        stored.email_verified = user.email_verified;
        stored.verification_token = user.verification_token.clone();
        stored.verification_token_created_at = user.verification_token_created_at;
        stored.updated_at = user.updated_at;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use chrono::Utc;

    fn user(email: &str) -> User {
        User::new(email.to_string(), "hash".to_string(), Role::User, Utc::now())
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create(user("ada@uwaterloo.ca")).await.unwrap();

        let err = repo.create(user("ada@uwaterloo.ca")).await.unwrap_err();
        assert!(matches!(err, UserError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn test_lookup_by_token_and_verify() {
        let repo = InMemoryUserRepository::new();
        let mut created = repo.create(user("ada@uwaterloo.ca")).await.unwrap();
        let token = created.verification_token.clone().unwrap();

        let found = repo.get_by_verification_token(&token).await.unwrap().unwrap();
        assert_eq!(found.id, created.id);

        created.mark_verified(Utc::now());
        repo.update_verification(&created).await.unwrap();

        assert!(repo.get_by_verification_token(&token).await.unwrap().is_none());
        let stored = repo.get_by_email("ada@uwaterloo.ca").await.unwrap().unwrap();
        assert!(stored.email_verified);
    }

    #[tokio::test]
    async fn test_update_unknown_user() {
        let repo = InMemoryUserRepository::new();
        let err = repo.update_verification(&user("ghost@uwaterloo.ca")).await.unwrap_err();
        assert!(matches!(err, UserError::NotFound));
    }
}
