use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain_submissions::{
    ModerationDecision, Moderatable, RecordScope, SubmissionError, SubmissionResult,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Event, EventFilter};

/// Repository trait for Event persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Events admitted by `scope`, narrowed by the structured part of `filter`, in the scope's order
    async fn list(&self, scope: RecordScope, filter: EventFilter) -> SubmissionResult<Vec<Event>>;

    /// Publicly visible events among `ids`, in public order
    async fn visible_by_ids(&self, ids: Vec<Uuid>) -> SubmissionResult<Vec<Event>>;

    /// Store a new event
    async fn insert(&self, event: Event) -> SubmissionResult<Event>;

    /// Atomically review a pending event; anything else is `NotFoundOrWrongState`
    async fn moderate(
        &self,
        id: Uuid,
        decision: ModerationDecision,
        moderator: Uuid,
        at: DateTime<Utc>,
    ) -> SubmissionResult<Event>;

    /// Administrative override of every listed event regardless of status; returns the count changed
    async fn bulk_moderate(
        &self,
        ids: Vec<Uuid>,
        decision: ModerationDecision,
        moderator: Uuid,
        at: DateTime<Utc>,
    ) -> SubmissionResult<u64>;
}

/// In-memory implementation of EventRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryEventRepository {
    events: Arc<RwLock<HashMap<Uuid, Event>>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an event as-is, e.g. a scraped record
    pub async fn seed(&self, event: Event) {
        self.events.write().await.insert(event.id, event);
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn list(&self, scope: RecordScope, filter: EventFilter) -> SubmissionResult<Vec<Event>> {
        let events = self.events.read().await;

        let mut result: Vec<Event> = events
            .values()
            .filter(|e| scope.admits(&e.moderation) && filter.matches(e))
            .cloned()
            .collect();

        result.sort_by(|a, b| {
            scope
                .submission_order(&a.moderation, &b.moderation)
                .map(|order| order.then_with(|| a.id.cmp(&b.id)))
                .unwrap_or_else(|| Event::natural_order(a, b))
        });

        Ok(result)
    }

    async fn visible_by_ids(&self, ids: Vec<Uuid>) -> SubmissionResult<Vec<Event>> {
        let events = self.events.read().await;

        let mut result: Vec<Event> = ids
            .iter()
            .filter_map(|id| events.get(id))
            .filter(|e| e.is_publicly_visible())
            .cloned()
            .collect();
        result.sort_by(Event::natural_order);
        result.dedup_by_key(|e| e.id);

        Ok(result)
    }

    async fn insert(&self, event: Event) -> SubmissionResult<Event> {
        self.events.write().await.insert(event.id, event.clone());

        tracing::info!(event_id = %event.id, "Created event");
        Ok(event)
    }

    async fn moderate(
        &self,
        id: Uuid,
        decision: ModerationDecision,
        moderator: Uuid,
        at: DateTime<Utc>,
    ) -> SubmissionResult<Event> {
        let mut events = self.events.write().await;

        let event = events
            .get_mut(&id)
            .ok_or(SubmissionError::NotFoundOrWrongState(id))?;
        event.transition(&decision, moderator, at)?;

        tracing::info!(event_id = %id, status = %event.status(), "Moderated event");
        Ok(event.clone())
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

        let mut events = self.events.write().await;

        let mut updated = 0;
        for id in ids {
            if let Some(event) = events.get_mut(&id) {
                event.override_decision(&decision, moderator, at);
                updated += 1;
            }
        }

        tracing::info!(updated, "Bulk moderated events");
        Ok(updated)
    }
}
