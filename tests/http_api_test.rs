//! HTTP intake through the router, without binding a socket

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use feedback_redactor::adapters::database::RecordStore;
use feedback_redactor::adapters::memory::InMemoryStore;
use feedback_redactor::anonymization::AnonymizationEngine;
use feedback_redactor::core::{FeedbackRecord, FeedbackService};
use feedback_redactor::domain::{RecordId, StorageError};
use feedback_redactor::server::{intake_router, IntakeState};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn router_with(store: Arc<dyn RecordStore>, dry_run: bool) -> axum::Router {
    let service = FeedbackService::new(
        Arc::new(AnonymizationEngine::with_defaults().unwrap()),
        store,
        dry_run,
        Duration::from_secs(10),
    );
    intake_router(IntakeState {
        service: Arc::new(service),
    })
}

fn post_feedback(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/feedback")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_post_feedback_returns_record_key() {
    let store = Arc::new(InMemoryStore::new());
    let app = router_with(store.clone(), false);

    let response = app
        .oneshot(post_feedback(
            json!({
                "overall_response_quality": 2,
                "verbatim": "Contact me at jane@example.com or see https://docs.example.com",
                "question": "My SSN is 123-45-6789",
                "allow_contact": false
            })
            .to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    let id: RecordId = serde_json::from_value(body["record_id"].clone()).unwrap();
    let record = store.get(&id).unwrap();
    assert_eq!(
        record.fields["verbatim"],
        "Contact me at <REDACTED> or see https://docs.example.com"
    );
    assert_eq!(record.fields["question"], "My SSN is <REDACTED>");
    assert_eq!(record.passthrough["allow_contact"], json!(false));
}

#[tokio::test]
async fn test_response_never_echoes_pii() {
    let app = router_with(Arc::new(InMemoryStore::new()), false);

    let response = app
        .oneshot(post_feedback(
            json!({"answer": "mail bob@corp.example"}).to_string(),
        ))
        .await
        .unwrap();

    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64)
        .await
        .unwrap();
    assert!(!String::from_utf8_lossy(&bytes).contains("bob@corp.example"));
}

#[tokio::test]
async fn test_dry_run_returns_accepted() {
    let store = Arc::new(InMemoryStore::new());
    let app = router_with(store.clone(), true);

    let response = app
        .oneshot(post_feedback(json!({"question": "hi"}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = body_json(response).await;
    assert_eq!(body["accepted"], true);
    assert!(body.get("record_id").is_none());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = router_with(Arc::new(InMemoryStore::new()), false);

    let response = app
        .oneshot(post_feedback("{\"question\": ".to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_unsupported_schema_version_is_bad_request() {
    let store = Arc::new(InMemoryStore::new());
    let app = router_with(store.clone(), false);

    let response = app
        .oneshot(post_feedback(
            json!({"schema_version": 9, "question": "hi"}).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(store.is_empty());
}

struct DownStore;

#[async_trait]
impl RecordStore for DownStore {
    async fn test_connection(&self) -> Result<(), StorageError> {
        Err(StorageError::ConnectionFailed("refused".to_string()))
    }

    async fn ensure_schema(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn store(&self, _record: &FeedbackRecord) -> Result<RecordId, StorageError> {
        Err(StorageError::ConnectionFailed("refused".to_string()))
    }

    fn backend_name(&self) -> &str {
        "down"
    }
}

#[tokio::test]
async fn test_storage_outage_is_bad_gateway() {
    let app = router_with(Arc::new(DownStore), false);

    let response = app
        .oneshot(post_feedback(
            json!({"question": "call 555-123-4567"}).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "STORAGE_ERROR");
    assert!(!body.to_string().contains("555-123-4567"));
}

#[tokio::test]
async fn test_health() {
    let app = router_with(Arc::new(InMemoryStore::new()), false);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}
