//! Feedback intake
//!
//! [`FeedbackService`] runs one submission end to end: validate, split into
//! text and passthrough fields, redact every text field, assemble the record
//! and hand it to the store in a single terminal write.

use crate::adapters::database::RecordStore;
use crate::anonymization::{AnonymizationEngine, ScanReport};
use crate::config::RedactorConfig;
use crate::core::assembler::{assemble, FeedbackRecord};
use crate::domain::{AnonymizationError, FeedbackSubmission, FieldSchema, RecordId, Result};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// The record was durably written under this key
    Stored(RecordId),
    /// Redaction succeeded but nothing was written (dry run)
    Accepted,
}

impl SubmissionOutcome {
    pub fn record_id(&self) -> Option<&RecordId> {
        match self {
            SubmissionOutcome::Stored(id) => Some(id),
            SubmissionOutcome::Accepted => None,
        }
    }
}

/// Orchestrates redaction and storage of feedback submissions
///
/// The engine and store are shared read-only across concurrent requests.
pub struct FeedbackService {
    engine: Arc<AnonymizationEngine>,
    store: Arc<dyn RecordStore>,
    dry_run: bool,
    request_timeout: Duration,
}

impl FeedbackService {
    pub fn new(
        engine: Arc<AnonymizationEngine>,
        store: Arc<dyn RecordStore>,
        dry_run: bool,
        request_timeout: Duration,
    ) -> Self {
        Self {
            engine,
            store,
            dry_run,
            request_timeout,
        }
    }

    /// Build the service from configuration
    ///
    /// Initializes the engine and, unless `application.dry_run` is set,
    /// creates the store and checks it once.
    pub async fn from_config(config: &RedactorConfig) -> Result<Self> {
        let engine = AnonymizationEngine::initialize(
            &config.recognizer,
            &config.policies,
            &config.audit,
        )?;

        let store = crate::adapters::database::create_record_store(&config.storage).await?;
        let service = Self::new(
            Arc::new(engine),
            store,
            config.application.dry_run,
            Duration::from_millis(config.intake.request_timeout_ms),
        );

        if config.application.dry_run {
            tracing::warn!("Dry run enabled: submissions are redacted but never stored");
        } else {
            service.startup_check().await?;
        }

        Ok(service)
    }

    /// Check store availability and schema
    pub async fn startup_check(&self) -> Result<()> {
        self.store.test_connection().await?;
        self.store.ensure_schema().await?;
        tracing::info!(backend = self.store.backend_name(), "Record store ready");
        Ok(())
    }

    pub fn engine(&self) -> &AnonymizationEngine {
        &self.engine
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Redact a submission and store the resulting record
    ///
    /// # Errors
    ///
    /// Validation and anonymization failures abort before anything is
    /// written. Storage errors are returned as-is.
    pub async fn submit(&self, submission: FeedbackSubmission) -> Result<SubmissionOutcome> {
        let record = self.redact_submission(&submission).await?;

        if self.dry_run {
            tracing::info!(
                record_id = %record.id,
                fields = record.redacted_field_count(),
                "DRY RUN: record assembled, not stored"
            );
            return Ok(SubmissionOutcome::Accepted);
        }

        let id = self.store.store(&record).await?;
        crate::log_record_stored!(&id, self.store.backend_name(), record.redacted_field_count());
        Ok(SubmissionOutcome::Stored(id))
    }

    /// Validate, split and redact a submission into a record, without storing it
    pub async fn redact_submission(
        &self,
        submission: &FeedbackSubmission,
    ) -> Result<FeedbackRecord> {
        let received_at = Utc::now();
        submission.validate()?;

        let schema = FieldSchema::for_version(submission.schema_version)?;
        let split = schema.split(submission)?;

        let start = Instant::now();
        let redacted = tokio::time::timeout(
            self.request_timeout,
            self.engine.anonymize_fields(&split.text_fields),
        )
        .await
        .map_err(|_| {
            AnonymizationError::RecognitionUnavailable(format!(
                "submission redaction exceeded {} ms",
                self.request_timeout.as_millis()
            ))
        })??;

        tracing::debug!(
            fields = redacted.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Submission redacted"
        );

        assemble(
            RecordId::generate(received_at),
            received_at,
            split.schema_version,
            redacted,
            split.passthrough,
        )
    }

    /// Detection report for a submission; no text is changed and nothing is stored
    pub async fn scan(&self, submission: &FeedbackSubmission) -> Result<ScanReport> {
        submission.validate()?;
        let schema = FieldSchema::for_version(submission.schema_version)?;
        let split = schema.split(submission)?;

        let mut report = ScanReport::new();
        for field in &split.text_fields {
            report.add_field(self.engine.scan(field).await?);
        }
        Ok(report)
    }

    /// Release the engine once no request holds it
    pub fn shutdown(self) {
        match Arc::try_unwrap(self.engine) {
            Ok(engine) => engine.shutdown(),
            Err(engine) => tracing::warn!(
                references = Arc::strong_count(&engine),
                "Anonymization engine still in use at shutdown"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::{RedactorError, StorageError};
    use async_trait::async_trait;
    use serde_json::json;

    fn submission() -> FeedbackSubmission {
        serde_json::from_value(json!({
            "overall_response_quality": 2,
            "verbatim": "Contact me at jane@example.com or see https://docs.example.com",
            "question": "My SSN is 123-45-6789",
            "fantastic": false,
            "case_number": "CASE-1"
        }))
        .unwrap()
    }

    fn service(store: Arc<dyn RecordStore>, dry_run: bool) -> FeedbackService {
        FeedbackService::new(
            Arc::new(AnonymizationEngine::with_defaults().unwrap()),
            store,
            dry_run,
            Duration::from_secs(10),
        )
    }

    struct FailingStore;

    #[async_trait]
    impl RecordStore for FailingStore {
        async fn test_connection(&self) -> std::result::Result<(), StorageError> {
            Err(StorageError::ConnectionFailed("down".to_string()))
        }
        async fn ensure_schema(&self) -> std::result::Result<(), StorageError> {
            Ok(())
        }
        async fn store(
            &self,
            _record: &FeedbackRecord,
        ) -> std::result::Result<RecordId, StorageError> {
            Err(StorageError::InsertFailed("down".to_string()))
        }
        fn backend_name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_submit_stores_redacted_record() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(store.clone(), false);

        let outcome = service.submit(submission()).await.unwrap();
        let id = outcome.record_id().unwrap().clone();
        let record = store.get(&id).unwrap();

        assert!(record.fields["verbatim"].contains("https://docs.example.com"));
        assert!(!record.fields["verbatim"].contains("jane@example.com"));
        assert_eq!(record.fields["question"], "My SSN is <REDACTED>");
        assert_eq!(record.passthrough["case_number"], "CASE-1");
        assert_eq!(record.passthrough["overall_response_quality"], 2);
    }

    #[tokio::test]
    async fn test_dry_run_accepts_without_storing() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(store.clone(), true);

        let outcome = service.submit(submission()).await.unwrap();
        assert_eq!(outcome, SubmissionOutcome::Accepted);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_storage_error_surfaces() {
        let service = service(Arc::new(FailingStore), false);
        let result = service.submit(submission()).await;
        assert!(matches!(
            result,
            Err(RedactorError::Storage(StorageError::InsertFailed(_)))
        ));
        assert!(service.startup_check().await.is_err());
    }

    #[tokio::test]
    async fn test_validation_error_before_redaction() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(store.clone(), false);

        let mut bad = submission();
        bad.overall_response_quality = Some(9);
        assert!(matches!(
            service.submit(bad).await,
            Err(RedactorError::Validation(_))
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_scan_reports_without_changes() {
        let service = service(Arc::new(InMemoryStore::new()), false);
        let report = service.scan(&submission()).await.unwrap();

        assert_eq!(report.total_fields, 2);
        assert_eq!(report.fields_with_pii, 2);
        assert_eq!(report.detections_by_type.get("URL"), Some(&1));
        assert_eq!(report.detections_by_action.get("keep"), Some(&1));
    }

    #[tokio::test]
    async fn test_shutdown_releases_engine() {
        let service = service(Arc::new(InMemoryStore::new()), false);
        service.shutdown();
    }
}
