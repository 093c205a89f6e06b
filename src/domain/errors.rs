//! Domain error types
//!
//! This module defines the error hierarchy for the redactor. Detection and
//! configuration failures abort a submission; storage failures are reported
//! as-is so the caller can retry the terminal write.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main redactor error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum RedactorError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// PII detection and redaction errors
    #[error("Anonymization error: {0}")]
    Anonymization(#[from] AnonymizationError),

    /// Record store errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Submission validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Errors raised while detecting or redacting PII
///
/// None of these may be downgraded to "no PII found": a field that could
/// not be scanned must never be stored.
#[derive(Debug, Error)]
pub enum AnonymizationError {
    /// The recognizer could not run (not loaded, timed out, crashed, or
    /// asked for an unsupported language)
    #[error("Recognition unavailable: {0}")]
    RecognitionUnavailable(String),

    /// A field referenced a policy context with no registered policy
    #[error("No redaction policy registered for context '{0}'")]
    InvalidFieldContext(String),

    /// Re-scanning the redacted text kept producing redactable matches
    #[error("Redaction of field '{field}' did not converge after {passes} passes")]
    NotConverged { field: String, passes: usize },
}

/// Record store errors
///
/// Errors that occur when writing assembled records.
/// These errors don't expose third-party driver types.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to connect to the store
    #[error("Failed to connect to record store: {0}")]
    ConnectionFailed(String),

    /// A record with the same key already exists
    #[error("Record already exists: {0}")]
    Conflict(String),

    /// Failed to insert the record
    #[error("Failed to insert record: {0}")]
    InsertFailed(String),

    /// Failed to create or migrate the storage schema
    #[error("Failed to prepare storage schema: {0}")]
    SchemaFailed(String),

    /// Timeout
    #[error("Storage timeout: {0}")]
    Timeout(String),

    /// Failed to serialize the record
    #[error("Failed to serialize record: {0}")]
    Serialization(String),
}

impl RedactorError {
    /// Process exit code used by the CLI for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            RedactorError::Configuration(_) => 2,
            RedactorError::Anonymization(AnonymizationError::InvalidFieldContext(_)) => 2,
            RedactorError::Validation(_) | RedactorError::Serialization(_) => 3,
            RedactorError::Storage(_) => 4,
            _ => 5,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for RedactorError {
    fn from(err: std::io::Error) -> Self {
        RedactorError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for RedactorError {
    fn from(err: serde_json::Error) -> Self {
        RedactorError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for RedactorError {
    fn from(err: toml::de::Error) -> Self {
        RedactorError::Configuration(format!("TOML parse error: {err}"))
    }
}
