use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain_submissions::{
    ModerationDecision, Moderatable, RecordScope, SubmissionError, SubmissionResult,
    SubmissionStatus,
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
    models::{Event, EventFilter},
    repository::EventRepository,
};

pub struct PgEventRepository {
    db: DatabaseConnection,
}

impl PgEventRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn natural_order(query: Select<entity::Entity>) -> Select<entity::Entity> {
    query
        .order_by_asc(entity::Column::Date)
        .order_by_asc(entity::Column::StartTime)
}

fn scoped(scope: RecordScope) -> Select<entity::Entity> {
    let query = entity::Entity::find()
        .filter(entity::Column::Status.is_in(scope.statuses().iter().copied()));

    match scope {
        RecordScope::Public => natural_order(query),
        RecordScope::SubmittedBy(owner) => query
            .filter(entity::Column::SubmittedBy.eq(owner))
            .order_by_desc(entity::Column::SubmittedAt),
        RecordScope::ModerationQueue => query.order_by_asc(entity::Column::SubmittedAt),
    }
    .order_by_asc(entity::Column::Id)
}

/// `COALESCE(price, 0)`: events without a price count as free
fn effective_price() -> Expr {
    Expr::expr(Func::coalesce([
        Expr::col(entity::Column::Price),
        Expr::val(0.0_f64),
    ]))
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn list(&self, scope: RecordScope, filter: EventFilter) -> SubmissionResult<Vec<Event>> {
        let mut query = scoped(scope);

        if let Some(start) = filter.start_date {
            query = query.filter(entity::Column::Date.gte(start));
        }
        if let Some(end) = filter.end_date {
            query = query.filter(entity::Column::Date.lte(end));
        }
        if let Some(min) = filter.min_price {
            query = query.filter(effective_price().gte(min));
        }
        if let Some(max) = filter.max_price {
            query = query.filter(effective_price().lte(max));
        }
        if let Some(club_type) = filter.club_type {
            query = query.filter(entity::Column::ClubType.eq(club_type));
        }

        let models = query.all(&self.db).await?;
        Ok(models.into_iter().map(Event::from).collect())
    }

    async fn visible_by_ids(&self, ids: Vec<Uuid>) -> SubmissionResult<Vec<Event>> {
        let query = entity::Entity::find()
            .filter(entity::Column::Status.is_in(SubmissionStatus::PUBLIC))
            .filter(entity::Column::Id.is_in(ids));

        let models = natural_order(query)
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Event::from).collect())
    }

    async fn insert(&self, event: Event) -> SubmissionResult<Event> {
        let model = entity::ActiveModel::from(&event).insert(&self.db).await?;

        tracing::info!(event_id = %model.id, "Created event");
        Ok(model.into())
    }

    async fn moderate(
        &self,
        id: Uuid,
        decision: ModerationDecision,
        moderator: Uuid,
        at: DateTime<Utc>,
    ) -> SubmissionResult<Event> {
        let txn = self.db.begin().await?;

        // Row lock scoped to pending: concurrent moderators queue here and
        // find nothing once the first one commits
        let model = entity::Entity::find_by_id(id)
            .filter(entity::Column::Status.eq(SubmissionStatus::Pending))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(SubmissionError::NotFoundOrWrongState(id))?;

        let mut event = Event::from(model);
        event.transition(&decision, moderator, at)?;

        let mut active = entity::review_columns(&event.moderation);
        active.id = Set(id);
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        tracing::info!(event_id = %id, status = %event.status(), "Moderated event");
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

        tracing::info!(updated = result.rows_affected, "Bulk moderated events");
        Ok(result.rows_affected)
    }
}
