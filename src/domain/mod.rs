//! Domain models and types for the redactor.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Record keys** ([`PartitionKey`], [`RowKey`], [`RecordId`])
//! - **Submission schema** ([`FeedbackSubmission`], [`FieldSchema`])
//! - **Pipeline units** ([`FeedbackField`], [`RedactedField`], [`PolicyContext`])
//! - **Error types** ([`RedactorError`], [`AnonymizationError`], [`StorageError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, RedactorError>`]:
//!
//! ```rust
//! use feedback_redactor::domain::{FeedbackSubmission, Result};
//!
//! fn example(json: &str) -> Result<FeedbackSubmission> {
//!     let submission: FeedbackSubmission = serde_json::from_str(json)?;
//!     submission.validate()?;
//!     Ok(submission)
//! }
//! ```

pub mod errors;
pub mod feedback;
pub mod ids;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{AnonymizationError, RedactorError, StorageError};
pub use feedback::{
    DocReference, FeedbackField, FeedbackSubmission, FieldSchema, PolicyContext, RedactedField,
    SplitSubmission, CURRENT_SCHEMA_VERSION, MAX_QUALITY_RATING, MAX_TEXT_FIELD_CHARS,
    MIN_QUALITY_RATING,
};
pub use ids::{PartitionKey, RecordId, RowKey};
pub use result::Result;
