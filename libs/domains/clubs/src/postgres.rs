use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain_submissions::{
    ModerationDecision, Moderatable, RecordScope, SubmissionError, SubmissionResult,
    SubmissionStatus, like_contains_pattern,
};
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::{Expr, ExprTrait, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    entity,
    models::{Club, ClubFilter},
    repository::ClubRepository,
};

pub struct PgClubRepository {
    db: DatabaseConnection,
}

impl PgClubRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn lower_name() -> Expr {
    Expr::expr(Func::lower(Expr::col(entity::Column::ClubName)))
}

fn scoped(scope: RecordScope) -> Select<entity::Entity> {
    let query = entity::Entity::find()
        .filter(entity::Column::Status.is_in(scope.statuses().iter().copied()));

    match scope {
        RecordScope::Public => query.order_by_asc(entity::Column::ClubName),
        RecordScope::SubmittedBy(owner) => query
            .filter(entity::Column::SubmittedBy.eq(owner))
            .order_by_desc(entity::Column::SubmittedAt),
        RecordScope::ModerationQueue => query.order_by_asc(entity::Column::SubmittedAt),
    }
    .order_by_asc(entity::Column::Id)
}

#[async_trait]
impl ClubRepository for PgClubRepository {
    async fn list(&self, scope: RecordScope, filter: ClubFilter) -> SubmissionResult<Vec<Club>> {
        let mut query = scoped(scope);

        if let Some(search) = filter.search_term() {
            query = query.filter(lower_name().like(like_contains_pattern(search)));
        }

        if let Some(category) = filter.category_term() {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(entity::Column::Categories)))
                    .like(like_contains_pattern(category)),
            );
        }

        if let Some(club_type) = filter.club_type {
            query = query.filter(entity::Column::ClubType.eq(club_type));
        }

        let models = query.all(&self.db).await?;
        Ok(models.into_iter().map(Club::from).collect())
    }

    async fn visible_name_exists(&self, name: &str) -> SubmissionResult<bool> {
        let exists = entity::Entity::find()
            .filter(entity::Column::Status.is_in(SubmissionStatus::PUBLIC))
            .filter(lower_name().eq(name.to_lowercase()))
            .one(&self.db)
            .await?
            .is_some();
        Ok(exists)
    }

    async fn insert(&self, club: Club) -> SubmissionResult<Club> {
        let model = entity::ActiveModel::from(&club).insert(&self.db).await?;

        tracing::info!(club_id = %model.id, "Created club");
        Ok(model.into())
    }

    async fn moderate(
        &self,
        id: Uuid,
        decision: ModerationDecision,
        moderator: Uuid,
        at: DateTime<Utc>,
    ) -> SubmissionResult<Club> {
        let txn = self.db.begin().await?;

        // Row lock scoped to pending: concurrent moderators queue here and
        // find nothing once the first one commits
        let model = entity::Entity::find_by_id(id)
            .filter(entity::Column::Status.eq(SubmissionStatus::Pending))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(SubmissionError::NotFoundOrWrongState(id))?;

        let mut club = Club::from(model);
        club.transition(&decision, moderator, at)?;

        let mut active = entity::review_columns(&club.moderation);
        active.id = Set(id);
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        tracing::info!(club_id = %id, status = %club.status(), "Moderated club");
        Ok(updated.into())
    }

    async fn bulk_moderate(
        &self,
        ids: Vec<Uuid>,
        decision: ModerationDecision,
        moderator: Uuid,
        at: DateTime<Utc>,
    ) -> SubmissionResult<u64> {
        let rejection_reason = match &decision {
            ModerationDecision::Approve => None,
            ModerationDecision::Reject { reason } => Some(reason.clone()),
        };

        let result = entity::Entity::update_many()
            .set(entity::ActiveModel {
                status: Set(decision.target_status()),
                reviewed_by: Set(Some(moderator)),
                reviewed_at: Set(Some(at.into())),
                rejection_reason: Set(rejection_reason),
                ..Default::default()
            })
            .filter(entity::Column::Id.is_in(ids))
            .exec(&self.db)
            .await?;

        tracing::info!(updated = result.rows_affected, "Bulk moderated clubs");
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn model(status: SubmissionStatus) -> entity::Model {
        let now: DateTime<FixedOffset> = Utc::now().into();
        entity::Model {
            id: Uuid::new_v4(),
            club_name: "Chess Club".to_string(),
            categories: "Games".to_string(),
            club_page: None,
            ig: None,
            discord: None,
            club_type: None,
            status,
            submitted_by: Some(Uuid::new_v4()),
            submitted_at: Some(now),
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_moderate_missing_pending_row_is_wrong_state() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();
        let repo = PgClubRepository::new(db);

        let id = Uuid::new_v4();
        let err = repo
            .moderate(id, ModerationDecision::Approve, Uuid::new_v4(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::NotFoundOrWrongState(got) if got == id));
    }

    #[tokio::test]
    async fn test_moderate_pending_row() {
        let pending = model(SubmissionStatus::Pending);
        let moderator = Uuid::new_v4();
        let mut approved = pending.clone();
        approved.status = SubmissionStatus::Approved;
        approved.reviewed_by = Some(moderator);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending.clone()]])
            .append_query_results([vec![approved]])
            .into_connection();
        let repo = PgClubRepository::new(db);

        let club = repo
            .moderate(pending.id, ModerationDecision::Approve, moderator, Utc::now())
            .await
            .unwrap();
        assert_eq!(club.status(), SubmissionStatus::Approved);
        assert_eq!(club.moderation.reviewed_by, Some(moderator));
    }

    #[tokio::test]
    async fn test_bulk_moderate_reports_rows_affected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            }])
            .into_connection();
        let repo = PgClubRepository::new(db);

        let updated = repo
            .bulk_moderate(
                vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()],
                ModerationDecision::Reject { reason: "closed".into() },
                Uuid::new_v4(),
                Utc::now(),
            )
            .await
            .unwrap();
        assert_eq!(updated, 3);
    }
}
