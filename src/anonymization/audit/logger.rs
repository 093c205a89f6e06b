//! Audit logger for redaction operations

use crate::anonymization::models::PiiMatch;
use crate::anonymization::policy::Action;
use crate::domain::PolicyContext;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// One detection as applied to a field, borrowed from the pipeline
pub struct AppliedDetection<'a> {
    pub matched: &'a PiiMatch,
    pub action: &'a Action,
    pub original: &'a str,
}

/// Audit log entry
#[derive(Debug, Serialize)]
struct AuditLogEntry {
    timestamp: String,
    field: String,
    context: String,
    detections_count: usize,
    passes: usize,
    processing_time_ms: u64,
    detections: Vec<AuditDetection>,
}

/// Audit detection entry (with hashed PII)
#[derive(Debug, Serialize)]
struct AuditDetection {
    entity_type: String,
    action: &'static str,
    start: usize,
    end: usize,
    confidence: f32,
    /// SHA-256 hash of original value (never log plaintext PII)
    value_hash: String,
}

/// Audit logger for redaction operations
///
/// Appends one line per anonymized field. Writes are serialized through a
/// mutex so concurrent requests never interleave partial lines.
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    write_lock: Mutex<()>,
}

impl AuditLogger {
    /// Create a new audit logger, creating the parent directory if needed
    pub fn new(log_path: PathBuf, json_format: bool) -> Result<Self> {
        if let Some(parent) = log_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create audit log directory: {}", parent.display())
                })?;
            }
        }

        Ok(Self {
            log_path,
            json_format,
            write_lock: Mutex::new(()),
        })
    }

    /// Record the detections applied to one field
    pub fn log_field(
        &self,
        field: &str,
        context: &PolicyContext,
        detections: &[AppliedDetection<'_>],
        passes: usize,
        processing_time_ms: u64,
    ) -> Result<()> {
        let entry = AuditLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            field: field.to_string(),
            context: context.to_string(),
            detections_count: detections.len(),
            passes,
            processing_time_ms,
            detections: detections
                .iter()
                .map(|d| AuditDetection {
                    entity_type: d.matched.entity_type.label().to_string(),
                    action: d.action.kind(),
                    start: d.matched.start,
                    end: d.matched.end,
                    confidence: d.matched.confidence,
                    value_hash: hash_pii_value(d.original),
                })
                .collect(),
        };

        self.write_entry(&entry)
    }

    /// Write an audit entry to the log file
    fn write_entry(&self, entry: &AuditLogEntry) -> Result<()> {
        let line = if self.json_format {
            serde_json::to_string(entry).context("Failed to serialize audit entry")?
        } else {
            format!(
                "[{}] Field: {} | Context: {} | Detections: {} | Passes: {} | Time: {}ms",
                entry.timestamp,
                entry.field,
                entry.context,
                entry.detections_count,
                entry.passes,
                entry.processing_time_ms
            )
        };

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("Audit log lock poisoned"))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;

        writeln!(file, "{line}").context("Failed to write audit entry")?;
        Ok(())
    }
}

/// Hash a PII value using SHA-256
pub fn hash_pii_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    format!("{result:x}")
}
