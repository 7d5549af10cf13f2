//! Handler tests for Events domain
//!
//! These tests drive the events router directly with in-memory collaborators:
//! - Multipart submission parsing and validation order
//! - Search, similarity and calendar export responses
//! - Moderation status codes and error bodies

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::{JwtClaims, MODERATOR_ROLE};
use blob_store::InMemoryBlobStore;
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use domain_events::*;
use domain_submissions::{InMemoryIdentityVerifier, ModerationState};
use domain_vector::{EmbeddingModel, EmbeddingService, SearchConfig, StaticEmbeddingProvider};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt; // For oneshot()
use uuid::Uuid;

const BOUNDARY: &str = "campus-test-boundary";

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn text_body(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn claims(user: Uuid, roles: &[&str]) -> JwtClaims {
    JwtClaims {
        sub: user.to_string(),
        email: "someone@uwaterloo.ca".to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        exp: 0,
        iat: 0,
        jti: Uuid::new_v4().to_string(),
    }
}

fn request(method: &str, uri: &str, as_user: Option<JwtClaims>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let mut request = builder
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();
    if let Some(claims) = as_user {
        request.extensions_mut().insert(claims);
    }
    request
}

/// multipart/form-data body with text fields and an optional image part
fn multipart(fields: &[(&str, &str)], image: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, content_type, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn submit_request(as_user: Option<JwtClaims>, body: Vec<u8>) -> Request<Body> {
    let mut request = Request::builder()
        .method("POST")
        .uri("/submit")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    if let Some(claims) = as_user {
        request.extensions_mut().insert(claims);
    }
    request
}

fn in_days(days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(days)).to_string()
}

struct TestApp {
    repo: InMemoryEventRepository,
    verifier: InMemoryIdentityVerifier,
    blobs: InMemoryBlobStore,
}

impl TestApp {
    fn new() -> Self {
        Self::with_blobs(InMemoryBlobStore::new())
    }

    fn with_blobs(blobs: InMemoryBlobStore) -> Self {
        Self {
            repo: InMemoryEventRepository::new(),
            verifier: InMemoryIdentityVerifier::new(),
            blobs,
        }
    }

    fn router(&self) -> Router {
        let provider = StaticEmbeddingProvider::new()
            .with_text("hackathon", vec![1.0, 0.0])
            .with_text("Overnight build sprint", vec![0.95, 0.05])
            .with_fallback(vec![0.0, 1.0]);
        let embeddings = EmbeddingService::new(
            Arc::new(provider),
            EmbeddingModel::Custom(2),
            std::time::Duration::from_secs(1),
        );

        handlers::router(EventService::new(
            self.repo.clone(),
            Arc::new(self.verifier.clone()),
            Arc::new(self.blobs.clone()),
            embeddings,
            SearchConfig::default(),
        ))
    }

    async fn verified_user(&self) -> Uuid {
        let user = Uuid::new_v4();
        self.verifier.mark_verified(user).await;
        user
    }
}

fn scraped(name: &str, date: NaiveDate, embedding: Option<Vec<f32>>) -> Event {
    Event {
        id: Uuid::new_v4(),
        club_handle: Some("uwcsclub".to_string()),
        url: Some("https://example.com/events".to_string()),
        name: name.to_string(),
        date,
        start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(20, 0, 0),
        location: "MC Comfy Lounge".to_string(),
        price: None,
        food: Some("Pizza".to_string()),
        registration: false,
        image_url: None,
        description: Some("Internal description".to_string()),
        embedding,
        added_at: Utc::now(),
        club_type: None,
        reactions: json!({}),
        notes: Some("scraped from instagram".to_string()),
        moderation: ModerationState::scraped(),
    }
}

fn valid_fields(date: &str) -> Vec<(&'static str, String)> {
    vec![
        ("name", "Hack Night".to_string()),
        ("location", "E7 2nd floor".to_string()),
        ("date", date.to_string()),
        ("start_time", "18:00".to_string()),
        ("end_time", "22:00".to_string()),
        ("price", "0".to_string()),
        ("description", "Overnight build sprint".to_string()),
    ]
}

fn as_refs<'a>(fields: &'a [(&'static str, String)]) -> Vec<(&'static str, &'a str)> {
    fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
}

const PNG: (&str, &str, &[u8]) = ("poster.png", "image/png", &[0x89, b'P', b'N', b'G']);

#[tokio::test]
async fn test_public_list_hides_internal_fields() {
    let app = TestApp::new();
    let date = Utc::now().date_naive() + Duration::days(3);
    app.repo.seed(scraped("Games Night", date, Some(vec![0.0, 1.0]))).await;

    let response = app.router().oneshot(request("GET", "/", None, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response.into_body()).await;
    let events = body.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["name"], "Games Night");
    assert_eq!(events[0]["start_time"], "18:00:00");
    assert!(events[0].get("embedding").is_none());
    assert!(events[0].get("notes").is_none());
    assert!(events[0].get("status").is_none());
}

#[tokio::test]
async fn test_search_with_no_close_match_is_empty() {
    let app = TestApp::new();
    let date = Utc::now().date_naive() + Duration::days(3);
    app.repo.seed(scraped("Games Night", date, Some(vec![0.0, 1.0]))).await;

    let response = app
        .router()
        .oneshot(request("GET", "/?search=hackathon", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_inverted_date_range_is_400() {
    let app = TestApp::new();
    let response = app
        .router()
        .oneshot(request(
            "GET",
            "/?start_date=2026-12-01&end_date=2026-11-01",
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = json_body(response.into_body()).await;
    assert!(body["details"]["start_date"].is_array());
}

#[tokio::test]
async fn test_similarity_requires_query() {
    let app = TestApp::new();
    let response = app
        .router()
        .oneshot(request("GET", "/similarity", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_similarity_reports_scores() {
    let app = TestApp::new();
    let date = Utc::now().date_naive() + Duration::days(3);
    let hack = scraped("Hackathon", date, Some(vec![1.0, 0.0]));
    app.repo.seed(hack.clone()).await;
    app.repo.seed(scraped("Games Night", date, Some(vec![0.0, 1.0]))).await;

    let response = app
        .router()
        .oneshot(request("GET", "/similarity?q=hackathon&limit=5", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["search_query"], "hackathon");
    assert_eq!(body["limit"], 5);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], hack.id.to_string());
}

#[tokio::test]
async fn test_similarity_min_date_skips_earlier_events() {
    let app = TestApp::new();
    let date = Utc::now().date_naive() + Duration::days(3);
    app.repo.seed(scraped("Hackathon", date, Some(vec![1.0, 0.0]))).await;

    let uri = format!("/similarity?q=hackathon&min_date={}", date + Duration::days(1));
    let response = app
        .router()
        .oneshot(request("GET", &uri, None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["min_date"], (date + Duration::days(1)).to_string());
    assert!(body["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_export_ics() {
    let app = TestApp::new();
    let date = NaiveDate::from_ymd_opt(2026, 11, 3).unwrap();
    let event = scraped("Hack Night", date, None);
    app.repo.seed(event.clone()).await;

    let response = app
        .router()
        .oneshot(request("GET", &format!("/export.ics?ids={}", event.id), None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/calendar; charset=utf-8"
    );
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"events.ics\""
    );

    let body = text_body(response.into_body()).await;
    assert!(body.starts_with("BEGIN:VCALENDAR\r\n"));
    assert!(body.contains("DTSTART:20261103T180000\r\n"));
    assert!(body.contains(&format!("UID:{}@campus-events", event.id)));
}

#[tokio::test]
async fn test_calendar_export_errors() {
    let app = TestApp::new();

    let missing = app
        .router()
        .oneshot(request("GET", "/export.ics", None, None))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let malformed = app
        .router()
        .oneshot(request("GET", "/google-calendar-urls?ids=1,2", None, None))
        .await
        .unwrap();
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

    let unknown = app
        .router()
        .oneshot(request(
            "GET",
            &format!("/google-calendar-urls?ids={}", Uuid::new_v4()),
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_google_calendar_urls() {
    let app = TestApp::new();
    let date = NaiveDate::from_ymd_opt(2026, 11, 3).unwrap();
    let event = scraped("Hack Night", date, None);
    app.repo.seed(event.clone()).await;

    let response = app
        .router()
        .oneshot(request(
            "GET",
            &format!("/google-calendar-urls?ids={}", event.id),
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: CalendarUrls = json_body(response.into_body()).await;
    assert_eq!(body.urls.len(), 1);
    assert!(body.urls[0].contains("text=Hack%20Night"));
    assert!(body.urls[0].contains("dates=20261103T180000%2F20261103T200000"));
}

#[tokio::test]
async fn test_submit_requires_authentication() {
    let app = TestApp::new();
    let fields = valid_fields(&in_days(7));
    let response = app
        .router()
        .oneshot(submit_request(None, multipart(&as_refs(&fields), Some(PNG))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unverified_submitter_is_forbidden() {
    let app = TestApp::new();
    let response = app
        .router()
        .oneshot(submit_request(
            Some(claims(Uuid::new_v4(), &["user"])),
            multipart(&[], None),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(app.blobs.is_empty().await);
}

#[tokio::test]
async fn test_submit_creates_pending_event() {
    let app = TestApp::new();
    let user = app.verified_user().await;
    let fields = valid_fields(&in_days(7));

    let response = app
        .router()
        .oneshot(submit_request(
            Some(claims(user, &["user"])),
            multipart(&as_refs(&fields), Some(PNG)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["name"], "Hack Night");
    assert_eq!(body["submitted_by"], user.to_string());
    assert!(body["reviewed_by"].is_null());
    assert!(
        body["image_url"]
            .as_str()
            .unwrap()
            .starts_with("memory://events/submitted/")
    );
    assert_eq!(app.blobs.len().await, 1);

    // Pending events stay out of the public list
    let public = app.router().oneshot(request("GET", "/", None, None)).await.unwrap();
    let public: Value = json_body(public.into_body()).await;
    assert_eq!(public, json!([]));

    let mine = app
        .router()
        .oneshot(request("GET", "/submissions", Some(claims(user, &["user"])), None))
        .await
        .unwrap();
    let mine: Value = json_body(mine.into_body()).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_submit_past_date_is_field_error() {
    let app = TestApp::new();
    let user = app.verified_user().await;
    let fields = valid_fields(&in_days(-1));

    let response = app
        .router()
        .oneshot(submit_request(
            Some(claims(user, &["user"])),
            multipart(&as_refs(&fields), Some(PNG)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["details"]["date"][0], "Event date must be in the future");
}

#[tokio::test]
async fn test_submit_end_before_start_is_field_error() {
    let app = TestApp::new();
    let user = app.verified_user().await;
    let mut fields = valid_fields(&in_days(7));
    fields.push(("start_time", "14:00".to_string()));
    fields.push(("end_time", "13:00".to_string()));

    let response = app
        .router()
        .oneshot(submit_request(
            Some(claims(user, &["user"])),
            multipart(&as_refs(&fields), Some(PNG)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = json_body(response.into_body()).await;
    assert!(body["details"]["end_time"].is_array());
}

#[tokio::test]
async fn test_submit_without_image_is_field_error() {
    let app = TestApp::new();
    let user = app.verified_user().await;
    let fields = valid_fields(&in_days(7));

    let response = app
        .router()
        .oneshot(submit_request(
            Some(claims(user, &["user"])),
            multipart(&as_refs(&fields), None),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = json_body(response.into_body()).await;
    assert!(body["details"]["image"].is_array());
}

#[tokio::test]
async fn test_upload_failure_is_bad_gateway_and_stores_nothing() {
    let app = TestApp::with_blobs(InMemoryBlobStore::failing());
    let user = app.verified_user().await;
    let fields = valid_fields(&in_days(7));

    let response = app
        .router()
        .oneshot(submit_request(
            Some(claims(user, &["user"])),
            multipart(&as_refs(&fields), Some(PNG)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let mine = app
        .router()
        .oneshot(request("GET", "/submissions", Some(claims(user, &["user"])), None))
        .await
        .unwrap();
    let mine: Value = json_body(mine.into_body()).await;
    assert_eq!(mine, json!([]));
}

#[tokio::test]
async fn test_moderation_flow() {
    let app = TestApp::new();
    let user = app.verified_user().await;
    let moderator = Uuid::new_v4();
    let fields = valid_fields(&in_days(7));

    let created = app
        .router()
        .oneshot(submit_request(
            Some(claims(user, &["user"])),
            multipart(&as_refs(&fields), Some(PNG)),
        ))
        .await
        .unwrap();
    let created: Value = json_body(created.into_body()).await;
    let id = created["id"].as_str().unwrap().to_string();
    let uri = format!("/submissions/{id}/moderate");

    // Regular users cannot see the queue or moderate
    let forbidden = app
        .router()
        .oneshot(request("GET", "/submissions/pending", Some(claims(user, &["user"])), None))
        .await
        .unwrap();
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let queue = app
        .router()
        .oneshot(request(
            "GET",
            "/submissions/pending",
            Some(claims(moderator, &["user", MODERATOR_ROLE])),
            None,
        ))
        .await
        .unwrap();
    let queue: Value = json_body(queue.into_body()).await;
    assert_eq!(queue[0]["id"], id.as_str());

    let missing_reason = app
        .router()
        .oneshot(request(
            "PATCH",
            &uri,
            Some(claims(moderator, &[MODERATOR_ROLE])),
            Some(json!({ "status": "rejected" })),
        ))
        .await
        .unwrap();
    assert_eq!(missing_reason.status(), StatusCode::BAD_REQUEST);

    let rejected = app
        .router()
        .oneshot(request(
            "PATCH",
            &uri,
            Some(claims(moderator, &[MODERATOR_ROLE])),
            Some(json!({ "status": "rejected", "rejection_reason": "spam" })),
        ))
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::OK);
    let rejected: Value = json_body(rejected.into_body()).await;
    assert_eq!(rejected["status"], "rejected");
    assert_eq!(rejected["rejection_reason"], "spam");
    assert_eq!(rejected["reviewed_by"], moderator.to_string());
    assert!(rejected["reviewed_at"].is_string());

    let again = app
        .router()
        .oneshot(request(
            "PATCH",
            &uri,
            Some(claims(moderator, &[MODERATOR_ROLE])),
            Some(json!({ "status": "approved" })),
        ))
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bulk_moderate() {
    let app = TestApp::new();
    let date = Utc::now().date_naive() + Duration::days(3);
    let listed = scraped("Games Night", date, None);
    app.repo.seed(listed.clone()).await;

    let response = app
        .router()
        .oneshot(request(
            "POST",
            "/submissions/bulk-moderate",
            Some(claims(Uuid::new_v4(), &[MODERATOR_ROLE])),
            Some(json!({ "ids": [listed.id], "status": "rejected", "rejection_reason": "cancelled" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["updated"], 1);

    let public = app.router().oneshot(request("GET", "/", None, None)).await.unwrap();
    let public: Value = json_body(public.into_body()).await;
    assert_eq!(public, json!([]));
}
