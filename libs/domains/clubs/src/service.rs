use chrono::Utc;
use domain_submissions::{
    BulkModerationRequest, BulkModerationResult, IdentityVerifier, ModerationDecision,
    ModerationRequest, RecordScope, SubmissionError, SubmissionResult, require_verified,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::models::{Club, ClubFilter, ClubSubmission, PublicClub, SubmitClub};
use crate::repository::ClubRepository;

/// Service layer for club submission, moderation and listing
#[derive(Clone)]
pub struct ClubService<R: ClubRepository> {
    repository: Arc<R>,
    verifier: Arc<dyn IdentityVerifier>,
}

impl<R: ClubRepository> ClubService<R> {
    pub fn new(repository: R, verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self {
            repository: Arc::new(repository),
            verifier,
        }
    }

    /// Visible clubs matching `filter`, by name
    pub async fn list_public(&self, filter: ClubFilter) -> SubmissionResult<Vec<PublicClub>> {
        let clubs = self.repository.list(RecordScope::Public, filter).await?;
        Ok(clubs.into_iter().map(PublicClub::from).collect())
    }

    /// The caller's own submissions, newest first
    pub async fn list_submitted_by(&self, user_id: Uuid) -> SubmissionResult<Vec<ClubSubmission>> {
        let clubs = self
            .repository
            .list(RecordScope::SubmittedBy(user_id), ClubFilter::default())
            .await?;
        Ok(clubs.into_iter().map(ClubSubmission::from).collect())
    }

    /// Pending clubs, oldest first
    pub async fn list_pending(&self) -> SubmissionResult<Vec<ClubSubmission>> {
        let clubs = self
            .repository
            .list(RecordScope::ModerationQueue, ClubFilter::default())
            .await?;
        Ok(clubs.into_iter().map(ClubSubmission::from).collect())
    }

    /// Verification gate, field checks, name pre-check, then insert as pending.
    #[instrument(skip(self, input))]
    pub async fn submit(&self, user_id: Uuid, input: SubmitClub) -> SubmissionResult<ClubSubmission> {
        require_verified(self.verifier.as_ref(), user_id).await?;

        let new_club = input.into_new_club()?;

        if self.repository.visible_name_exists(&new_club.club_name).await? {
            return Err(SubmissionError::validation(
                "club_name",
                "A club with this name already exists",
            ));
        }

        let club = self
            .repository
            .insert(Club::submitted(new_club, user_id, Utc::now()))
            .await?;
        Ok(club.into())
    }

    /// Review a pending club
    pub async fn moderate(
        &self,
        id: Uuid,
        moderator: Uuid,
        request: ModerationRequest,
    ) -> SubmissionResult<ClubSubmission> {
        let decision = ModerationDecision::try_from(request)?;
        let club = self
            .repository
            .moderate(id, decision, moderator, Utc::now())
            .await?;
        Ok(club.into())
    }

    /// Administrative override across many clubs
    pub async fn bulk_moderate(
        &self,
        moderator: Uuid,
        request: BulkModerationRequest,
    ) -> SubmissionResult<BulkModerationResult> {
        let decision = request.decision()?;
        let updated = self
            .repository
            .bulk_moderate(request.ids, decision, moderator, Utc::now())
            .await?;
        Ok(BulkModerationResult { updated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryClubRepository, MockClubRepository};
    use domain_submissions::{InMemoryIdentityVerifier, SubmissionStatus};

    fn submit(name: &str) -> SubmitClub {
        SubmitClub {
            club_name: Some(name.to_string()),
            categories: Some("Games".to_string()),
            ..Default::default()
        }
    }

    async fn verified(user: Uuid) -> Arc<dyn IdentityVerifier> {
        let verifier = InMemoryIdentityVerifier::new();
        verifier.mark_verified(user).await;
        Arc::new(verifier)
    }

    #[tokio::test]
    async fn test_unverified_user_is_blocked_before_validation() {
        let mut repo = MockClubRepository::new();
        repo.expect_insert().never();
        repo.expect_visible_name_exists().never();
        let service = ClubService::new(repo, Arc::new(InMemoryIdentityVerifier::new()));

        // Empty payload would fail validation, but verification comes first
        let err = service.submit(Uuid::new_v4(), SubmitClub::default()).await.unwrap_err();
        assert!(matches!(err, SubmissionError::VerificationRequired));
    }

    #[tokio::test]
    async fn test_existing_visible_name_is_validation_error() {
        let user = Uuid::new_v4();
        let mut repo = MockClubRepository::new();
        repo.expect_visible_name_exists()
            .withf(|name| name == "Chess Club")
            .returning(|_| Ok(true));
        repo.expect_insert().never();
        let service = ClubService::new(repo, verified(user).await);

        let err = service.submit(user, submit(" Chess Club ")).await.unwrap_err();
        assert_eq!(err.field(), Some("club_name"));
    }

    #[tokio::test]
    async fn test_submit_then_list_own_submissions() {
        let user = Uuid::new_v4();
        let service = ClubService::new(InMemoryClubRepository::new(), verified(user).await);

        let created = service.submit(user, submit("Chess Club")).await.unwrap();
        assert_eq!(created.status, SubmissionStatus::Pending);

        let mine = service.list_submitted_by(user).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, created.id);
        assert_eq!(mine[0].status, SubmissionStatus::Pending);
        assert_eq!(mine[0].reviewed_by, None);

        assert!(service.list_public(ClubFilter::default()).await.unwrap().is_empty());
        assert!(service.list_submitted_by(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_pending_names_allowed_until_one_is_approved() {
        let user = Uuid::new_v4();
        let moderator = Uuid::new_v4();
        let service = ClubService::new(InMemoryClubRepository::new(), verified(user).await);

        let first = service.submit(user, submit("Chess Club")).await.unwrap();
        service.submit(user, submit("chess club")).await.unwrap();

        service
            .moderate(
                first.id,
                moderator,
                ModerationRequest {
                    status: SubmissionStatus::Approved,
                    rejection_reason: None,
                },
            )
            .await
            .unwrap();

        let err = service.submit(user, submit("CHESS CLUB")).await.unwrap_err();
        assert_eq!(err.field(), Some("club_name"));
    }

    #[tokio::test]
    async fn test_reject_without_reason_never_reaches_store() {
        let mut repo = MockClubRepository::new();
        repo.expect_moderate().never();
        let service = ClubService::new(repo, Arc::new(InMemoryIdentityVerifier::new()));

        let err = service
            .moderate(
                Uuid::new_v4(),
                Uuid::new_v4(),
                ModerationRequest {
                    status: SubmissionStatus::Rejected,
                    rejection_reason: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("rejection_reason"));
    }

    #[tokio::test]
    async fn test_bulk_requires_ids() {
        let mut repo = MockClubRepository::new();
        repo.expect_bulk_moderate().never();
        let service = ClubService::new(repo, Arc::new(InMemoryIdentityVerifier::new()));

        let err = service
            .bulk_moderate(
                Uuid::new_v4(),
                BulkModerationRequest {
                    ids: vec![],
                    status: SubmissionStatus::Approved,
                    rejection_reason: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("ids"));
    }
}
