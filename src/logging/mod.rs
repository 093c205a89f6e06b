//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - JSON-formatted file logs
//! - Configurable log levels
//! - Local file logging with rotation
//!
//! Free text from submissions is never logged; events carry field names,
//! contexts, counts and hashes only.
//!
//! # Example
//!
//! ```no_run
//! use feedback_redactor::logging::init_logging;
//! use feedback_redactor::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Service started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log a redacted field
///
/// # Example
///
/// ```no_run
/// use feedback_redactor::log_field_redacted;
/// use feedback_redactor::domain::PolicyContext;
/// use std::time::Duration;
///
/// let context = PolicyContext::plain();
/// log_field_redacted!("question", &context, 2, 1, "EMAIL=1,SSN=1", Duration::from_millis(3));
/// ```
#[macro_export]
macro_rules! log_field_redacted {
    ($field:expr, $context:expr, $detections:expr, $passes:expr, $entity_counts:expr, $duration:expr) => {
        tracing::info!(
            field = %$field,
            context = %$context,
            detections = $detections,
            passes = $passes,
            entity_counts = %$entity_counts,
            duration_ms = $duration.as_millis() as u64,
            "Field redacted"
        );
    };
}

/// Log a stored feedback record
///
/// # Example
///
/// ```no_run
/// use feedback_redactor::log_record_stored;
/// use feedback_redactor::domain::RecordId;
///
/// let id = RecordId::generate(chrono::Utc::now());
/// log_record_stored!(&id, "memory", 4);
/// ```
#[macro_export]
macro_rules! log_record_stored {
    ($record_id:expr, $backend:expr, $fields:expr) => {
        tracing::info!(
            record_id = %$record_id,
            backend = $backend,
            redacted_fields = $fields,
            "Feedback record stored"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use feedback_redactor::log_error_with_context;
/// use feedback_redactor::domain::RedactorError;
///
/// let error = RedactorError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

#[cfg(test)]
mod tests {
    use crate::domain::{PolicyContext, RecordId, RedactorError};
    use std::time::Duration;

    #[test]
    fn test_macros_expand() {
        let context = PolicyContext::verbatim();
        crate::log_field_redacted!("verbatim", &context, 1, 1, "EMAIL=1", Duration::from_millis(1));

        let id = RecordId::generate(chrono::Utc::now());
        crate::log_record_stored!(&id, "memory", 2);

        let error = RedactorError::Validation("bad rating".to_string());
        crate::log_error_with_context!(&error, "Submission rejected");
    }
}
