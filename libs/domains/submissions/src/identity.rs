use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{SubmissionError, SubmissionResult};

/// Answers whether an identity holds a verified email credential.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn is_email_verified(&self, identity: Uuid) -> SubmissionResult<bool>;
}

/// Gate applied before any submission is validated.
pub async fn require_verified(
    verifier: &dyn IdentityVerifier,
    identity: Uuid,
) -> SubmissionResult<()> {
    if verifier.is_email_verified(identity).await? {
        Ok(())
    } else {
        tracing::info!(user_id = %identity, "Submission blocked: email not verified");
        Err(SubmissionError::VerificationRequired)
    }
}

/// Verifier backed by a fixed set of verified identities (development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryIdentityVerifier {
    verified: Arc<RwLock<HashSet<Uuid>>>,
}

impl InMemoryIdentityVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn mark_verified(&self, identity: Uuid) {
        self.verified.write().await.insert(identity);
    }
}

#[async_trait]
impl IdentityVerifier for InMemoryIdentityVerifier {
    async fn is_email_verified(&self, identity: Uuid) -> SubmissionResult<bool> {
        Ok(self.verified.read().await.contains(&identity))
    }
}
