// Feedback Redactor - PII redaction for feedback submissions
// Copyright (c) 2025 Feedback Redactor Contributors
// Licensed under the MIT License

//! # Feedback Redactor
//!
//! Feedback Redactor accepts structured feedback submissions and removes
//! personally identifiable information from their free-text fields before the
//! record is stored, while keeping content such as URLs where a field's policy
//! allows it.
//!
//! ## Overview
//!
//! This library provides:
//! - **Recognizing** PII spans (email, phone, SSN, card numbers, IP addresses,
//!   URLs, names) with a TOML-configured pattern library
//! - **Resolving** each span to an action (replace, keep, mask) under a named
//!   policy context
//! - **Redacting** text back-to-front to a fixed point, so redacted output
//!   re-scans clean
//! - **Storing** assembled records in an append-only keyed store
//!
//! ## Architecture
//!
//! - [`anonymization`] - Recognizer, policy engine and redaction pipeline
//! - [`core`] - Record assembly and submission orchestration
//! - [`adapters`] - Record stores (in-memory, PostgreSQL)
//! - [`server`] - HTTP intake
//! - [`domain`] - Submission schema, record keys and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//! - [`cli`] - Command-line interface and argument parsing
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use feedback_redactor::anonymization::AnonymizationEngine;
//! use feedback_redactor::domain::{FeedbackField, PolicyContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = AnonymizationEngine::with_defaults()?;
//!
//!     let field = FeedbackField::new(
//!         "verbatim",
//!         "Contact me at jane@example.com or see https://docs.example.com",
//!         PolicyContext::verbatim(),
//!     );
//!     let redacted = engine.anonymize(&field).await?;
//!
//!     assert!(redacted.text.contains("https://docs.example.com"));
//!     assert!(!redacted.text.contains("jane@example.com"));
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`domain::Result`], whose error type is
//! [`domain::RedactorError`]. A field that could not be scanned is an error,
//! never "no PII found":
//!
//! ```rust,no_run
//! use feedback_redactor::domain::{AnonymizationError, RedactorError};
//!
//! fn is_retryable(err: &RedactorError) -> bool {
//!     matches!(
//!         err,
//!         RedactorError::Storage(_)
//!             | RedactorError::Anonymization(AnonymizationError::RecognitionUnavailable(_))
//!     )
//! }
//! ```

pub mod adapters;
pub mod anonymization;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod server;
