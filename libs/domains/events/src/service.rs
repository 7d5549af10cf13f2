use blob_store::BlobStore;
use chrono::{DateTime, Utc};
use domain_submissions::{
    BulkModerationRequest, BulkModerationResult, IdentityVerifier, ModerationDecision,
    ModerationRequest, RecordScope, SubmissionError, SubmissionResult, non_blank,
    require_verified,
};
use domain_vector::{EmbeddingService, SearchConfig, SimilarityQuery, VectorError, rank};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::calendar;
use crate::models::{
    CalendarQuery, CalendarUrls, Event, EventFilter, EventForm, EventSubmission, PublicEvent,
    SimilarEvent, SimilarityParams, SimilarityResponse,
};
use crate::repository::EventRepository;

fn embedding_error(err: VectorError) -> SubmissionError {
    tracing::error!(error = %err, "Embedding request failed");
    SubmissionError::Embedding(err.to_string())
}

/// Ranks the embedded events against `query`, best first.
fn ranked_ids(query: &[f32], events: &[Event], options: &SimilarityQuery) -> Vec<(Uuid, f32)> {
    let candidates = events
        .iter()
        .filter_map(|e| e.embedding.as_deref().map(|v| (e.id, e.date, v)));

    rank(query, candidates, options)
        .into_iter()
        .map(|m| (m.id, m.score))
        .collect()
}

/// Service layer for event submission, moderation, search and export
#[derive(Clone)]
pub struct EventService<R: EventRepository> {
    repository: Arc<R>,
    verifier: Arc<dyn IdentityVerifier>,
    blob_store: Arc<dyn BlobStore>,
    embeddings: EmbeddingService,
    search: SearchConfig,
}

impl<R: EventRepository> EventService<R> {
    pub fn new(
        repository: R,
        verifier: Arc<dyn IdentityVerifier>,
        blob_store: Arc<dyn BlobStore>,
        embeddings: EmbeddingService,
        search: SearchConfig,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            verifier,
            blob_store,
            embeddings,
            search,
        }
    }

    /// Visible events matching `filter`. With a search term the result is
    /// restricted to events ranked above the similarity threshold and follows
    /// that ranking; otherwise it keeps the natural date order.
    #[instrument(skip(self, filter), fields(search = filter.search_term().is_some()))]
    pub async fn list_public(&self, filter: EventFilter) -> SubmissionResult<Vec<PublicEvent>> {
        filter.validate()?;
        let search = filter.search_term().map(str::to_string);
        let mut options = SimilarityQuery::new(self.search.similarity_threshold);
        if let Some(start_date) = filter.start_date {
            options = options.with_min_date(start_date);
        }

        let events = self.repository.list(RecordScope::Public, filter).await?;

        let Some(search) = search else {
            return Ok(events.into_iter().map(PublicEvent::from).collect());
        };

        let query = self
            .embeddings
            .embed_text(&search)
            .await
            .map_err(embedding_error)?;
        let ranked = ranked_ids(&query, &events, &options);
        tracing::debug!(candidates = events.len(), matched = ranked.len(), "Ranked events");

        let mut by_id: HashMap<Uuid, Event> = events.into_iter().map(|e| (e.id, e)).collect();
        Ok(ranked
            .into_iter()
            .filter_map(|(id, _)| by_id.remove(&id))
            .map(PublicEvent::from)
            .collect())
    }

    /// Similarity scores of visible events for an ad-hoc query
    #[instrument(skip(self, params))]
    pub async fn similar(&self, params: SimilarityParams) -> SubmissionResult<SimilarityResponse> {
        let search_query = non_blank(params.q.as_deref())
            .ok_or_else(|| {
                SubmissionError::validation("q", "Search query parameter 'q' is required")
            })?
            .to_string();

        let threshold = params.threshold.unwrap_or(self.search.similarity_threshold);
        if !(-1.0..=1.0).contains(&threshold) {
            return Err(SubmissionError::validation(
                "threshold",
                "threshold must be between -1 and 1",
            ));
        }
        if params.limit == Some(0) {
            return Err(SubmissionError::validation("limit", "limit must be positive"));
        }

        let query = self
            .embeddings
            .embed_text(&search_query)
            .await
            .map_err(embedding_error)?;
        let events = self
            .repository
            .list(RecordScope::Public, EventFilter::default())
            .await?;

        let mut options = SimilarityQuery::new(threshold);
        if let Some(limit) = params.limit {
            options = options.with_limit(limit);
        }
        if let Some(min_date) = params.min_date {
            options = options.with_min_date(min_date);
        }

        let by_id: HashMap<Uuid, &Event> = events.iter().map(|e| (e.id, e)).collect();
        let results = ranked_ids(&query, &events, &options)
            .into_iter()
            .filter_map(|(id, similarity)| {
                by_id.get(&id).map(|event| SimilarEvent {
                    id,
                    name: event.name.clone(),
                    date: event.date,
                    similarity,
                })
            })
            .collect();

        Ok(SimilarityResponse {
            search_query,
            threshold,
            limit: params.limit,
            min_date: params.min_date,
            results,
        })
    }

    /// The caller's own submissions, newest first
    pub async fn list_submitted_by(&self, user_id: Uuid) -> SubmissionResult<Vec<EventSubmission>> {
        let events = self
            .repository
            .list(RecordScope::SubmittedBy(user_id), EventFilter::default())
            .await?;
        Ok(events.into_iter().map(EventSubmission::from).collect())
    }

    /// Pending events, oldest first
    pub async fn list_pending(&self) -> SubmissionResult<Vec<EventSubmission>> {
        let events = self
            .repository
            .list(RecordScope::ModerationQueue, EventFilter::default())
            .await?;
        Ok(events.into_iter().map(EventSubmission::from).collect())
    }

    pub async fn submit(&self, user_id: Uuid, form: EventForm) -> SubmissionResult<EventSubmission> {
        self.submit_at(user_id, form, Utc::now()).await
    }

    /// Verification gate, field checks, description embedding, image upload,
    /// then insert as pending. Any failure leaves no record behind.
    #[instrument(skip(self, form))]
    pub async fn submit_at(
        &self,
        user_id: Uuid,
        form: EventForm,
        now: DateTime<Utc>,
    ) -> SubmissionResult<EventSubmission> {
        require_verified(self.verifier.as_ref(), user_id).await?;

        let (new_event, image) = form.validate(now.date_naive())?;

        let embedding = match new_event.description.as_deref() {
            Some(description) => Some(
                self.embeddings
                    .embed_text(description)
                    .await
                    .map_err(embedding_error)?,
            ),
            None => None,
        };

        let path = image.storage_path(Uuid::new_v4());
        let image_url = self
            .blob_store
            .upload(image.bytes, &path, &image.content_type)
            .await
            .ok_or_else(|| {
                tracing::error!(path = %path, "Event image upload failed");
                SubmissionError::UploadFailed
            })?;

        let event = self
            .repository
            .insert(Event::submitted(new_event, image_url, embedding, user_id, now))
            .await?;
        Ok(event.into())
    }

    /// Review a pending event
    pub async fn moderate(
        &self,
        id: Uuid,
        moderator: Uuid,
        request: ModerationRequest,
    ) -> SubmissionResult<EventSubmission> {
        let decision = ModerationDecision::try_from(request)?;
        let event = self
            .repository
            .moderate(id, decision, moderator, Utc::now())
            .await?;
        Ok(event.into())
    }

    /// Administrative override across many events
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

    async fn calendar_events(&self, query: &CalendarQuery) -> SubmissionResult<Vec<Event>> {
        let ids = query.parse_ids()?;
        let events = self.repository.visible_by_ids(ids).await?;
        if events.is_empty() {
            return Err(SubmissionError::NotFound(
                "No events found with the provided IDs".to_string(),
            ));
        }
        Ok(events)
    }

    /// iCalendar document for the requested visible events
    pub async fn export_ics(&self, query: CalendarQuery) -> SubmissionResult<String> {
        let events = self.calendar_events(&query).await?;
        Ok(calendar::to_ics(&events, Utc::now()))
    }

    /// One Google Calendar link per requested visible event
    pub async fn google_calendar_urls(&self, query: CalendarQuery) -> SubmissionResult<CalendarUrls> {
        let events = self.calendar_events(&query).await?;
        Ok(CalendarUrls {
            urls: events.iter().map(calendar::google_calendar_url).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageUpload;
    use crate::repository::{InMemoryEventRepository, MockEventRepository};
    use blob_store::InMemoryBlobStore;
    use chrono::TimeZone;
    use domain_submissions::{InMemoryIdentityVerifier, ModerationState, SubmissionStatus};
    use domain_vector::{EmbeddingModel, StaticEmbeddingProvider};
    use std::time::Duration;

    const DIM: u32 = 3;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> chrono::NaiveDate {
        chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn embeddings(provider: StaticEmbeddingProvider) -> EmbeddingService {
        EmbeddingService::new(
            Arc::new(provider),
            EmbeddingModel::Custom(DIM),
            Duration::from_secs(1),
        )
    }

    fn provider() -> StaticEmbeddingProvider {
        StaticEmbeddingProvider::new()
            .with_text("hackathon", vec![1.0, 0.0, 0.0])
            .with_text("Build robots all night", vec![0.9, 0.1, 0.0])
            .with_text("Board games and tea", vec![0.0, 1.0, 0.0])
    }

    async fn verified(user: Uuid) -> Arc<dyn IdentityVerifier> {
        let verifier = InMemoryIdentityVerifier::new();
        verifier.mark_verified(user).await;
        Arc::new(verifier)
    }

    fn service_with<R: EventRepository>(
        repo: R,
        verifier: Arc<dyn IdentityVerifier>,
        blobs: Arc<dyn BlobStore>,
    ) -> EventService<R> {
        EventService::new(repo, verifier, blobs, embeddings(provider()), SearchConfig::default())
    }

    fn form(description: Option<&str>) -> EventForm {
        let form = EventForm::new()
            .with_field("name", "Robot Night")
            .with_field("location", "E5")
            .with_field("date", "2026-10-30")
            .with_field("start_time", "18:00")
            .with_field("end_time", "22:00")
            .with_image(ImageUpload {
                filename: Some("poster.jpg".into()),
                content_type: Some("image/jpeg".into()),
                bytes: vec![0xFF, 0xD8],
            });
        match description {
            Some(text) => form.with_field("description", text),
            None => form,
        }
    }

    fn listed(name: &str, date: &str, embedding: Option<Vec<f32>>) -> Event {
        let (new_event, _) = form(None)
            .with_field("name", name)
            .with_field("date", date)
            .validate(now().date_naive())
            .unwrap();
        Event {
            embedding,
            moderation: ModerationState::scraped(),
            ..Event::submitted(new_event, "memory://x.jpg".into(), None, Uuid::new_v4(), now())
        }
    }

    #[tokio::test]
    async fn test_unverified_submitter_never_uploads() {
        let mut repo = MockEventRepository::new();
        repo.expect_insert().never();
        let blobs = Arc::new(InMemoryBlobStore::new());
        let service = service_with(repo, Arc::new(InMemoryIdentityVerifier::new()), blobs.clone());

        let err = service.submit_at(Uuid::new_v4(), EventForm::new(), now()).await.unwrap_err();
        assert!(matches!(err, SubmissionError::VerificationRequired));
        assert!(blobs.is_empty().await);
    }

    #[tokio::test]
    async fn test_past_date_is_validation_error() {
        let user = Uuid::new_v4();
        let service = service_with(
            InMemoryEventRepository::new(),
            verified(user).await,
            Arc::new(InMemoryBlobStore::new()),
        );

        let err = service
            .submit_at(user, form(None).with_field("date", "2026-10-15"), now())
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("date"));
    }

    #[tokio::test]
    async fn test_submit_uploads_embeds_and_stores_pending() {
        let user = Uuid::new_v4();
        let blobs = Arc::new(InMemoryBlobStore::new());
        let repo = InMemoryEventRepository::new();
        let service = service_with(repo.clone(), verified(user).await, blobs.clone());

        let created = service
            .submit_at(user, form(Some("Build robots all night")), now())
            .await
            .unwrap();

        assert_eq!(created.status, SubmissionStatus::Pending);
        assert_eq!(created.submitted_by, Some(user));
        assert_eq!(created.submitted_at, Some(now()));
        let image_url = created.event.image_url.clone().unwrap();
        assert!(image_url.starts_with("memory://events/submitted/"));
        assert!(image_url.ends_with(".jpg"));
        assert_eq!(blobs.len().await, 1);

        let stored = repo
            .list(RecordScope::SubmittedBy(user), EventFilter::default())
            .await
            .unwrap();
        assert_eq!(stored[0].embedding, Some(vec![0.9, 0.1, 0.0]));

        let mine = service.list_submitted_by(user).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].reviewed_by, None);
    }

    #[tokio::test]
    async fn test_upload_failure_creates_nothing() {
        let user = Uuid::new_v4();
        let mut repo = MockEventRepository::new();
        repo.expect_insert().never();
        let service = service_with(repo, verified(user).await, Arc::new(InMemoryBlobStore::failing()));

        let err = service.submit_at(user, form(None), now()).await.unwrap_err();
        assert!(matches!(err, SubmissionError::UploadFailed));
    }

    #[tokio::test]
    async fn test_embedding_failure_is_fatal() {
        let user = Uuid::new_v4();
        let mut repo = MockEventRepository::new();
        repo.expect_insert().never();
        let blobs = InMemoryBlobStore::new();
        let service = service_with(repo, verified(user).await, Arc::new(blobs.clone()));

        // No vector registered for this description
        let err = service
            .submit_at(user, form(Some("Unknown text")), now())
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::Embedding(_)));
        assert!(blobs.is_empty().await);
    }

    #[tokio::test]
    async fn test_search_follows_similarity_rank() {
        let repo = InMemoryEventRepository::new();
        let robots = listed("Robots", "2026-11-05", Some(vec![0.9, 0.1, 0.0]));
        let exact = listed("Hackathon", "2026-11-09", Some(vec![1.0, 0.0, 0.0]));
        let games = listed("Games", "2026-11-01", Some(vec![0.0, 1.0, 0.0]));
        let unembedded = listed("No description", "2026-11-01", None);
        for event in [robots.clone(), exact.clone(), games, unembedded] {
            repo.seed(event).await;
        }
        let service = service_with(repo, Arc::new(InMemoryIdentityVerifier::new()), Arc::new(InMemoryBlobStore::new()));

        let all = service.list_public(EventFilter::default()).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].date, date(2026, 11, 1));

        let found = service
            .list_public(EventFilter {
                search: Some("hackathon".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![exact.id, robots.id]);

        let windowed = service
            .list_public(EventFilter {
                search: Some("hackathon".into()),
                end_date: Some(date(2026, 11, 6)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(windowed.len(), 1);
        assert_eq!(windowed[0].id, robots.id);
    }

    #[tokio::test]
    async fn test_search_without_matches_is_empty() {
        let repo = InMemoryEventRepository::new();
        repo.seed(listed("Games", "2026-11-01", Some(vec![0.0, 1.0, 0.0]))).await;
        repo.seed(listed("Plain", "2026-11-01", None)).await;
        let service = service_with(repo, Arc::new(InMemoryIdentityVerifier::new()), Arc::new(InMemoryBlobStore::new()));

        let found = service
            .list_public(EventFilter {
                search: Some("hackathon".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_filter_never_reaches_store() {
        let mut repo = MockEventRepository::new();
        repo.expect_list().never();
        let service = service_with(repo, Arc::new(InMemoryIdentityVerifier::new()), Arc::new(InMemoryBlobStore::new()));

        let err = service
            .list_public(EventFilter {
                min_price: Some(20.0),
                max_price: Some(10.0),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("min_price"));
    }

    #[tokio::test]
    async fn test_similarity_probe() {
        let repo = InMemoryEventRepository::new();
        let exact = listed("Hackathon", "2026-11-09", Some(vec![1.0, 0.0, 0.0]));
        repo.seed(exact.clone()).await;
        repo.seed(listed("Robots", "2026-11-05", Some(vec![0.9, 0.1, 0.0]))).await;
        let service = service_with(repo, Arc::new(InMemoryIdentityVerifier::new()), Arc::new(InMemoryBlobStore::new()));

        let response = service
            .similar(SimilarityParams {
                q: Some("hackathon".into()),
                threshold: None,
                limit: Some(1),
                min_date: None,
            })
            .await
            .unwrap();
        assert_eq!(response.threshold, 0.25);
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].id, exact.id);
        assert_eq!(response.results[0].name, "Hackathon");

        let upcoming = service
            .similar(SimilarityParams {
                q: Some("hackathon".into()),
                min_date: Some(date(2026, 11, 6)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(upcoming.min_date, Some(date(2026, 11, 6)));
        let ids: Vec<_> = upcoming.results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![exact.id]);

        let err = service.similar(SimilarityParams::default()).await.unwrap_err();
        assert_eq!(err.field(), Some("q"));
    }

    #[tokio::test]
    async fn test_calendar_export_requires_visible_events() {
        let repo = InMemoryEventRepository::new();
        let event = listed("Hackathon", "2026-11-09", None);
        repo.seed(event.clone()).await;
        let service = service_with(repo, Arc::new(InMemoryIdentityVerifier::new()), Arc::new(InMemoryBlobStore::new()));

        let ics = service
            .export_ics(CalendarQuery {
                ids: Some(event.id.to_string()),
            })
            .await
            .unwrap();
        assert!(ics.contains("SUMMARY:Hackathon"));

        let err = service
            .google_calendar_urls(CalendarQuery {
                ids: Some(Uuid::new_v4().to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::NotFound(_)));
    }
}
