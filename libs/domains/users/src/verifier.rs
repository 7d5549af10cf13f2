use async_trait::async_trait;
use domain_submissions::{IdentityVerifier, SubmissionResult};
use std::sync::Arc;
use uuid::Uuid;

use crate::repository::UserRepository;

/// Answers the submission gate from the accounts table.
///
/// Identities without an account count as unverified.
pub struct AccountIdentityVerifier<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> AccountIdentityVerifier<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

impl<R: UserRepository> Clone for AccountIdentityVerifier<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

#[async_trait]
impl<R: UserRepository> IdentityVerifier for AccountIdentityVerifier<R> {
    async fn is_email_verified(&self, identity: Uuid) -> SubmissionResult<bool> {
        let user = self.repository.get_by_id(identity).await?;
        Ok(user.is_some_and(|u| u.email_verified))
    }
}
