//! Dry-run scan reporting
//!
//! A scan runs detection and policy lookup without substituting anything.
//! Reports never carry the detected text itself, only positions, types and
//! the action that would be applied.

use crate::anonymization::models::{EntityType, PiiMatch};
use crate::anonymization::policy::Action;
use crate::domain::PolicyContext;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One detection with the action its context resolves to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanDetection {
    pub entity_type: EntityType,
    pub start: usize,
    pub end: usize,
    pub confidence: f32,
    pub action: Action,
    /// Whether the action came from an explicit policy entry rather than the default
    pub explicit_policy: bool,
}

impl ScanDetection {
    pub fn new(matched: &PiiMatch, action: &Action, explicit_policy: bool) -> Self {
        Self {
            entity_type: matched.entity_type.clone(),
            start: matched.start,
            end: matched.end,
            confidence: matched.confidence,
            action: action.clone(),
            explicit_policy,
        }
    }
}

/// Detections for a single field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldScan {
    pub field: String,
    pub context: PolicyContext,
    pub text_len: usize,
    pub detections: Vec<ScanDetection>,
}

impl FieldScan {
    /// Detections whose action would remove text
    pub fn redacting_count(&self) -> usize {
        self.detections
            .iter()
            .filter(|d| d.action.is_redacting())
            .count()
    }
}

/// Aggregated scan results across fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    /// Total fields scanned
    pub total_fields: usize,

    /// Fields with at least one detection
    pub fields_with_pii: usize,

    /// Total detections across all fields
    pub total_detections: usize,

    /// Detections by entity type label
    pub detections_by_type: BTreeMap<String, usize>,

    /// Detections by policy context
    pub detections_by_context: BTreeMap<String, usize>,

    /// Detections by resolved action kind
    pub detections_by_action: BTreeMap<String, usize>,

    /// Per-field results
    pub fields: Vec<FieldScan>,

    /// Configuration gaps noticed while scanning
    pub warnings: Vec<String>,
}

impl ScanReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one field's scan into the report
    pub fn add_field(&mut self, scan: FieldScan) {
        self.total_fields += 1;
        if !scan.detections.is_empty() {
            self.fields_with_pii += 1;
        }
        self.total_detections += scan.detections.len();

        for detection in &scan.detections {
            *self
                .detections_by_type
                .entry(detection.entity_type.label().to_string())
                .or_insert(0) += 1;
            *self
                .detections_by_context
                .entry(scan.context.to_string())
                .or_insert(0) += 1;
            *self
                .detections_by_action
                .entry(detection.action.kind().to_string())
                .or_insert(0) += 1;

            if !detection.entity_type.is_builtin() && !detection.explicit_policy {
                self.add_warning(format!(
                    "Entity type {} in field '{}' has no entry in context '{}'; default action applied",
                    detection.entity_type, scan.field, scan.context
                ));
            }
        }

        self.fields.push(scan);
    }

    /// Add a warning, ignoring exact duplicates
    pub fn add_warning(&mut self, warning: String) {
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }

    /// Format report for console output
    pub fn format_console(&self) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("                    REDACTION SCAN REPORT                      \n");
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output.push_str("SUMMARY\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!("  Fields Scanned:        {}\n", self.total_fields));
        output.push_str(&format!("  Fields with PII:       {}\n", self.fields_with_pii));
        output.push_str(&format!("  Total Detections:      {}\n", self.total_detections));
        output.push('\n');

        if !self.detections_by_type.is_empty() {
            output.push_str("DETECTIONS BY TYPE\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");

            let mut types: Vec<_> = self.detections_by_type.iter().collect();
            types.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

            for (label, count) in types {
                output.push_str(&format!("  {label:30} {count:>5}\n"));
            }
            output.push('\n');
        }

        if !self.fields.is_empty() {
            output.push_str("FIELDS\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");
            for field in &self.fields {
                output.push_str(&format!(
                    "  {} [{}] {} detection(s), {} redacted\n",
                    field.field,
                    field.context,
                    field.detections.len(),
                    field.redacting_count()
                ));
                for d in &field.detections {
                    output.push_str(&format!(
                        "    {:>6}..{:<6} {:14} {:.2} -> {}\n",
                        d.start,
                        d.end,
                        d.entity_type.label(),
                        d.confidence,
                        d.action.kind()
                    ));
                }
            }
            output.push('\n');
        }

        if !self.warnings.is_empty() {
            output.push_str("WARNINGS\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");
            for warning in &self.warnings {
                output.push_str(&format!("  • {warning}\n"));
            }
            output.push('\n');
        }

        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output
    }

    /// Format report as JSON
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
