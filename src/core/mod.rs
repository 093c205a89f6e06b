//! Core business logic for the redactor.
//!
//! # Modules
//!
//! - [`assembler`] - Merges redacted fields and passthrough metadata into a record
//! - [`intake`] - Submission orchestration from validation to the terminal store
//!
//! # Submission Workflow
//!
//! 1. **Validate**: Check ratings and text lengths
//! 2. **Split**: Separate free-text fields from passthrough metadata by schema version
//! 3. **Redact**: Anonymize every text field under its policy context
//! 4. **Assemble**: Build the [`FeedbackRecord`](assembler::FeedbackRecord)
//! 5. **Store**: One append-only insert under a fresh record key
//!
//! # Example
//!
//! ```rust,no_run
//! use feedback_redactor::config::load_config;
//! use feedback_redactor::core::intake::FeedbackService;
//! use feedback_redactor::domain::FeedbackSubmission;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("redactor.toml")?;
//! let service = FeedbackService::from_config(&config).await?;
//!
//! let submission: FeedbackSubmission =
//!     serde_json::from_str(r#"{"question": "My SSN is 123-45-6789"}"#)?;
//! let outcome = service.submit(submission).await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod intake;

pub use assembler::{assemble, FeedbackRecord};
pub use intake::{FeedbackService, SubmissionOutcome};
