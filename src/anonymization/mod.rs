//! PII detection and redaction
//!
//! This module removes personal data from free-text feedback fields before
//! they are stored.
//!
//! # Architecture
//!
//! The pipeline consists of:
//! - **Recognition**: pattern-based entity recognition with deterministic
//!   overlap resolution ([`recognizer`])
//! - **Policy**: per-context mapping from entity type to action ([`policy`])
//! - **Redaction**: back-to-front substitution, re-scanned to a fixed point
//!   ([`engine`])
//! - **Audit**: structured logging with hashed PII values ([`audit`])
//!
//! # Usage
//!
//! ```rust,ignore
//! use feedback_redactor::anonymization::AnonymizationEngine;
//!
//! let engine = AnonymizationEngine::with_defaults()?;
//! let redacted = engine.anonymize(&field).await?;
//! ```

pub mod audit;
pub mod config;
pub mod engine;
pub mod models;
pub mod policy;
pub mod recognizer;
pub mod report;

// Re-export main types
pub use config::{AuditConfig, RecognizerConfig};
pub use engine::{apply_actions, AnonymizationEngine, EngineSettings, MAX_REDACTION_PASSES};
pub use models::{EntityType, PiiMatch};
pub use policy::{Action, PolicyEngine, RedactionPolicy, PLACEHOLDER_TOKEN};
pub use recognizer::{resolve_overlaps, EntityRecognizer, PatternRegistry, RegexRecognizer};
pub use report::{FieldScan, ScanDetection, ScanReport};
