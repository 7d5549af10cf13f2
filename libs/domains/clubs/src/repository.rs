use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain_submissions::{
    ModerationDecision, Moderatable, RecordScope, SubmissionError, SubmissionResult,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Club, ClubFilter};

/// Repository trait for Club persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClubRepository: Send + Sync {
    /// Clubs admitted by `scope`, narrowed by `filter`, in the scope's order
    async fn list(&self, scope: RecordScope, filter: ClubFilter) -> SubmissionResult<Vec<Club>>;

    /// Whether a scraped or approved club already uses `name` (case-insensitive)
    async fn visible_name_exists(&self, name: &str) -> SubmissionResult<bool>;

    /// Store a new club
    async fn insert(&self, club: Club) -> SubmissionResult<Club>;

    /// Atomically review a pending club; anything else is `NotFoundOrWrongState`
    async fn moderate(
        &self,
        id: Uuid,
        decision: ModerationDecision,
        moderator: Uuid,
        at: DateTime<Utc>,
    ) -> SubmissionResult<Club>;

    /// Administrative override of every listed club regardless of status; returns the count changed
    async fn bulk_moderate(
        &self,
        ids: Vec<Uuid>,
        decision: ModerationDecision,
        moderator: Uuid,
        at: DateTime<Utc>,
    ) -> SubmissionResult<u64>;
}

/// In-memory implementation of ClubRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryClubRepository {
    clubs: Arc<RwLock<HashMap<Uuid, Club>>>,
}

impl InMemoryClubRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a club as-is, e.g. a scraped record
    pub async fn seed(&self, club: Club) {
        self.clubs.write().await.insert(club.id, club);
    }
}

/// Mirrors the partial unique index on visible club names.
fn ensure_name_free(clubs: &HashMap<Uuid, Club>, id: Uuid, name: &str) -> SubmissionResult<()> {
    if clubs.values().any(|c| c.id != id && c.claims_name(name)) {
        return Err(SubmissionError::Conflict(format!(
            "A club named '{}' is already listed",
            name
        )));
    }
    Ok(())
}

#[async_trait]
impl ClubRepository for InMemoryClubRepository {
    async fn list(&self, scope: RecordScope, filter: ClubFilter) -> SubmissionResult<Vec<Club>> {
        let clubs = self.clubs.read().await;

        let mut result: Vec<Club> = clubs
            .values()
            .filter(|c| scope.admits(&c.moderation) && filter.matches(c))
            .cloned()
            .collect();

        result.sort_by(|a, b| {
            scope
                .submission_order(&a.moderation, &b.moderation)
                .unwrap_or_else(|| a.club_name.cmp(&b.club_name))
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(result)
    }

    async fn visible_name_exists(&self, name: &str) -> SubmissionResult<bool> {
        let clubs = self.clubs.read().await;
        Ok(clubs.values().any(|c| c.claims_name(name)))
    }

    async fn insert(&self, club: Club) -> SubmissionResult<Club> {
        let mut clubs = self.clubs.write().await;
        if club.is_publicly_visible() {
            ensure_name_free(&clubs, club.id, &club.club_name)?;
        }
        clubs.insert(club.id, club.clone());

        tracing::info!(club_id = %club.id, "Created club");
        Ok(club)
    }

    async fn moderate(
        &self,
        id: Uuid,
        decision: ModerationDecision,
        moderator: Uuid,
        at: DateTime<Utc>,
    ) -> SubmissionResult<Club> {
        let mut clubs = self.clubs.write().await;

        let mut club = clubs
            .get(&id)
            .cloned()
            .ok_or(SubmissionError::NotFoundOrWrongState(id))?;
        club.transition(&decision, moderator, at)?;
        if club.is_publicly_visible() {
            ensure_name_free(&clubs, id, &club.club_name)?;
        }
        clubs.insert(id, club.clone());

        tracing::info!(club_id = %id, status = %club.status(), "Moderated club");
        Ok(club)
    }

    async fn bulk_moderate(
        &self,
        ids: Vec<Uuid>,
        decision: ModerationDecision,
        moderator: Uuid,
        at: DateTime<Utc>,
    ) -> SubmissionResult<u64> {
        let mut ids = ids;
        ids.sort_unstable();
        ids.dedup();

        let mut clubs = self.clubs.write().await;

        // All or nothing, like a single UPDATE statement
        let mut staged = clubs.clone();
        let mut updated = 0;
        for id in ids {
            let Some(mut club) = staged.get(&id).cloned() else {
                continue;
            };
            club.override_decision(&decision, moderator, at);
            if club.is_publicly_visible() {
                ensure_name_free(&staged, id, &club.club_name)?;
            }
            staged.insert(id, club);
            updated += 1;
        }
        *clubs = staged;

        tracing::info!(updated, "Bulk moderated clubs");
        Ok(updated)
    }
}
