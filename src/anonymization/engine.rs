//! Anonymization pipeline
//!
//! This module provides the [`AnonymizationEngine`] that turns a
//! [`FeedbackField`] into a [`RedactedField`]:
//!
//! 1. The recognizer scans the text on a blocking worker, bounded by a timeout.
//! 2. Spans are validated and reduced to a non-overlapping set.
//! 3. Each span's action is looked up for the field's policy context.
//! 4. Actions are applied from the highest start offset down, so every
//!    replacement leaves the offsets of the spans still to be processed intact.
//! 5. The output is re-scanned; steps 1-4 repeat until nothing redactable is
//!    left, so anonymizing already-anonymized text is a no-op.
//!
//! # Examples
//!
//! ```no_run
//! use feedback_redactor::anonymization::AnonymizationEngine;
//! use feedback_redactor::domain::{FeedbackField, PolicyContext};
//!
//! # async fn example() -> feedback_redactor::domain::Result<()> {
//! let engine = AnonymizationEngine::with_defaults()?;
//! let field = FeedbackField::new(
//!     "question",
//!     "My SSN is 123-45-6789",
//!     PolicyContext::plain(),
//! );
//! let redacted = engine.anonymize(&field).await?;
//! assert_eq!(redacted.text, "My SSN is <REDACTED>");
//! # Ok(())
//! # }
//! ```

use crate::anonymization::{
    audit::{AppliedDetection, AuditLogger},
    config::{AuditConfig, RecognizerConfig},
    models::PiiMatch,
    policy::{Action, PolicyEngine, RedactionPolicy},
    recognizer::{resolve_overlaps, EntityRecognizer, PatternRegistry, RegexRecognizer},
    report::{FieldScan, ScanDetection},
};
use crate::domain::{
    AnonymizationError, FeedbackField, PolicyContext, RedactedField, RedactorError, Result,
};
use std::borrow::{Borrow, Cow};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Upper bound on redact-then-rescan passes for one field
pub const MAX_REDACTION_PASSES: usize = 8;

type AnonymizationResult<T> = std::result::Result<T, AnonymizationError>;

/// Runtime settings for the pipeline
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Language passed to the recognizer for every field
    pub language: String,
    /// Upper bound on a single recognition call
    pub recognition_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&RecognizerConfig::default())
    }
}

impl From<&RecognizerConfig> for EngineSettings {
    fn from(config: &RecognizerConfig) -> Self {
        Self {
            language: config.default_language.clone(),
            recognition_timeout: Duration::from_millis(config.timeout_ms),
        }
    }
}

/// Anonymization pipeline
///
/// Owns the loaded recognizer and the policy table. Both are immutable after
/// construction, so one engine is shared by every request (usually behind an
/// `Arc`) and every method takes `&self`.
pub struct AnonymizationEngine {
    recognizer: Arc<dyn EntityRecognizer>,
    policies: Arc<PolicyEngine>,
    settings: EngineSettings,
    audit_logger: Option<AuditLogger>,
}

impl AnonymizationEngine {
    /// Create an engine from an already loaded recognizer and policy table
    ///
    /// Every replacement token is run through the recognizer first. A token
    /// that is itself recognized would be redacted again on every re-scan,
    /// so it is rejected here as a configuration error.
    ///
    /// # Errors
    ///
    /// Returns [`RedactorError::Configuration`] if the recognizer cannot scan
    /// the configured language or a replacement token is recognized as PII.
    pub fn new(
        recognizer: Arc<dyn EntityRecognizer>,
        policies: PolicyEngine,
        settings: EngineSettings,
    ) -> Result<Self> {
        if !recognizer.supports_language(&settings.language) {
            return Err(RedactorError::Configuration(format!(
                "Recognizer '{}' does not support language '{}'",
                recognizer.name(),
                settings.language
            )));
        }

        for token in policies.replacement_tokens() {
            let matches = recognizer
                .recognize(token, &settings.language)
                .map_err(|e| {
                    RedactorError::Configuration(format!(
                        "Could not validate replacement token '{token}': {e}"
                    ))
                })?;
            if let Some(found) = matches.first() {
                return Err(RedactorError::Configuration(format!(
                    "Replacement token '{token}' is itself recognized as {}",
                    found.entity_type
                )));
            }
        }

        tracing::info!(
            recognizer = recognizer.name(),
            language = %settings.language,
            timeout_ms = settings.recognition_timeout.as_millis() as u64,
            contexts = policies.contexts().len(),
            "Anonymization engine initialized"
        );

        Ok(Self {
            recognizer,
            policies: Arc::new(policies),
            settings,
            audit_logger: None,
        })
    }

    /// Engine with the embedded pattern library and built-in policies
    pub fn with_defaults() -> Result<Self> {
        Self::initialize(
            &RecognizerConfig::default(),
            &BTreeMap::new(),
            &AuditConfig::default(),
        )
    }

    /// Load the recognizer, policies and audit logger from configuration
    ///
    /// # Errors
    ///
    /// Returns [`RedactorError::Configuration`] if the pattern library cannot
    /// be loaded, a custom policy is invalid, or the audit log cannot be
    /// opened.
    pub fn initialize(
        recognizer_config: &RecognizerConfig,
        policies: &BTreeMap<String, RedactionPolicy>,
        audit_config: &AuditConfig,
    ) -> Result<Self> {
        recognizer_config
            .validate()
            .map_err(|e| RedactorError::Configuration(format!("{e:#}")))?;

        let registry = match recognizer_config.pattern_library {
            Some(ref path) => PatternRegistry::from_file(path),
            None => PatternRegistry::default_patterns(),
        }
        .map_err(|e| RedactorError::Configuration(format!("{e:#}")))?;

        tracing::debug!(
            patterns = registry.all_patterns().len(),
            entity_types = registry.entity_types().len(),
            "Pattern library loaded"
        );

        let recognizer = RegexRecognizer::with_registry(registry)
            .with_confidence_threshold(recognizer_config.confidence_threshold)
            .with_supported_languages(recognizer_config.supported_languages.clone());

        let policy_engine = PolicyEngine::with_custom(policies)?;
        let mut engine = Self::new(
            Arc::new(recognizer),
            policy_engine,
            EngineSettings::from(recognizer_config),
        )?;

        if audit_config.enabled {
            let logger = AuditLogger::new(audit_config.log_path.clone(), audit_config.json_format)
                .map_err(|e| RedactorError::Configuration(format!("{e:#}")))?;
            engine = engine.with_audit_logger(logger);
        }

        Ok(engine)
    }

    /// Attach an audit logger
    pub fn with_audit_logger(mut self, logger: AuditLogger) -> Self {
        self.audit_logger = Some(logger);
        self
    }

    /// The policy table
    pub fn policies(&self) -> &PolicyEngine {
        &self.policies
    }

    /// Name of the loaded recognizer
    pub fn recognizer_name(&self) -> &str {
        self.recognizer.name()
    }

    /// Whether the recognizer is loaded and usable
    pub fn is_ready(&self) -> bool {
        self.recognizer.is_ready()
    }

    /// Redact one field
    ///
    /// A kept span (for example a URL under `verbatim`) that contains a value
    /// redacted elsewhere in the field has that value rewritten the same way,
    /// so no redacted value survives inside kept text.
    ///
    /// # Errors
    ///
    /// - [`AnonymizationError::InvalidFieldContext`] if the field's context
    ///   has no policy.
    /// - [`AnonymizationError::RecognitionUnavailable`] if the recognizer is
    ///   not ready, times out, panics, or returns out-of-bounds spans.
    /// - [`AnonymizationError::NotConverged`] if re-scanning keeps finding
    ///   redactable text after [`MAX_REDACTION_PASSES`] passes, or a redacted
    ///   value still occurs in the output.
    pub async fn anonymize(&self, field: &FeedbackField) -> AnonymizationResult<RedactedField> {
        let started = Instant::now();
        self.ensure_context(&field.context)?;

        let mut text = field.raw_text.clone();
        let mut passes = 0;
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut audited: Vec<(PiiMatch, Action, String)> = Vec::new();
        let mut redacted_values: Vec<(String, Action)> = Vec::new();

        loop {
            let matches = self.detect(&text).await?;
            let resolved = self.plan(matches, &field.context)?;

            for (matched, action) in &resolved {
                let value = matched.slice(&text);
                if action.is_redacting() && !redacted_values.iter().any(|(v, _)| v == value) {
                    redacted_values.push((value.to_string(), (*action).clone()));
                }
            }
            let planned = shield_kept_spans(&text, resolved, &redacted_values);

            if !planned.iter().any(|(_, action)| action.is_redacting()) {
                break;
            }
            if passes == MAX_REDACTION_PASSES {
                return Err(AnonymizationError::NotConverged {
                    field: field.name.clone(),
                    passes,
                });
            }
            passes += 1;

            tally_redactions(&mut counts, &planned);
            for (matched, action) in &planned {
                if let Cow::Owned(_) = action {
                    tracing::debug!(
                        field = %field.name,
                        entity_type = %matched.entity_type,
                        "Kept span contained a redacted value"
                    );
                }
                if self.audit_logger.is_some() {
                    audited.push((
                        matched.clone(),
                        action.as_ref().clone(),
                        matched.slice(&text).to_string(),
                    ));
                }
            }

            text = apply_actions(&text, &planned);
        }

        // Fail closed if a redacted value still occurs outside any detected span
        if redacted_values.iter().any(|(value, _)| text.contains(value.as_str())) {
            return Err(AnonymizationError::NotConverged {
                field: field.name.clone(),
                passes,
            });
        }

        let elapsed = started.elapsed();
        crate::log_field_redacted!(
            &field.name,
            &field.context,
            counts.values().sum::<usize>(),
            passes,
            format_counts(&counts),
            elapsed
        );

        if let Some(ref logger) = self.audit_logger {
            let applied: Vec<AppliedDetection<'_>> = audited
                .iter()
                .map(|(matched, action, original)| AppliedDetection {
                    matched,
                    action,
                    original,
                })
                .collect();
            if let Err(e) = logger.log_field(
                &field.name,
                &field.context,
                &applied,
                passes,
                elapsed.as_millis() as u64,
            ) {
                tracing::error!(field = %field.name, error = %format!("{e:#}"), "Failed to write audit entry");
            }
        }

        Ok(RedactedField {
            name: field.name.clone(),
            text,
        })
    }

    /// Redact every field, in order, stopping at the first failure
    pub async fn anonymize_fields(
        &self,
        fields: &[FeedbackField],
    ) -> AnonymizationResult<Vec<RedactedField>> {
        let mut redacted = Vec::with_capacity(fields.len());
        for field in fields {
            redacted.push(self.anonymize(field).await?);
        }
        Ok(redacted)
    }

    /// Detect and resolve actions without changing the text
    pub async fn scan(&self, field: &FeedbackField) -> AnonymizationResult<FieldScan> {
        let policy = self
            .policies
            .policy(&field.context)
            .ok_or_else(|| AnonymizationError::InvalidFieldContext(field.context.to_string()))?;

        let matches = self.detect(&field.raw_text).await?;
        let detections = matches
            .iter()
            .map(|matched| {
                let (action, explicit) = policy.action_for(&matched.entity_type);
                ScanDetection::new(matched, action, explicit)
            })
            .collect();

        Ok(FieldScan {
            field: field.name.clone(),
            context: field.context.clone(),
            text_len: field.raw_text.len(),
            detections,
        })
    }

    /// Release the recognizer and policy table
    pub fn shutdown(self) {
        tracing::info!(
            recognizer = self.recognizer.name(),
            "Anonymization engine released"
        );
    }

    fn ensure_context(&self, context: &PolicyContext) -> AnonymizationResult<()> {
        if self.policies.has_context(context) {
            Ok(())
        } else {
            Err(AnonymizationError::InvalidFieldContext(context.to_string()))
        }
    }

    /// Run the recognizer off the async runtime and check what it returns
    async fn detect(&self, text: &str) -> AnonymizationResult<Vec<PiiMatch>> {
        if !self.recognizer.is_ready() {
            return Err(AnonymizationError::RecognitionUnavailable(format!(
                "recognizer '{}' is not ready",
                self.recognizer.name()
            )));
        }

        let recognizer = Arc::clone(&self.recognizer);
        let owned = text.to_string();
        let language = self.settings.language.clone();
        let worker =
            tokio::task::spawn_blocking(move || recognizer.recognize(&owned, &language));

        // An abandoned worker keeps running to completion; its result is dropped.
        let mut matches = match tokio::time::timeout(self.settings.recognition_timeout, worker).await
        {
            Err(_) => {
                return Err(AnonymizationError::RecognitionUnavailable(format!(
                    "recognition exceeded {}ms",
                    self.settings.recognition_timeout.as_millis()
                )))
            }
            Ok(Err(join_error)) => {
                return Err(AnonymizationError::RecognitionUnavailable(format!(
                    "recognizer worker failed: {join_error}"
                )))
            }
            Ok(Ok(result)) => result?,
        };

        if let Some(bad) = matches.iter().find(|m| !m.is_valid_for(text)) {
            return Err(AnonymizationError::RecognitionUnavailable(format!(
                "recognizer '{}' returned span {}..{} outside text of {} bytes",
                self.recognizer.name(),
                bad.start,
                bad.end,
                text.len()
            )));
        }

        let threshold = self.recognizer.confidence_threshold();
        matches.retain(|m| m.confidence >= threshold);
        Ok(resolve_overlaps(matches))
    }

    fn plan(
        &self,
        matches: Vec<PiiMatch>,
        context: &PolicyContext,
    ) -> AnonymizationResult<Vec<(PiiMatch, &Action)>> {
        matches
            .into_iter()
            .map(|matched| {
                let action = self.policies.resolve(&matched.entity_type, context)?;
                Ok((matched, action))
            })
            .collect()
    }
}

/// Apply planned actions to `text`
///
/// `planned` must be non-overlapping spans valid for `text`; its order does
/// not matter. Substitution runs from the highest start offset to the lowest
/// so each replacement only moves bytes after the spans still pending.
pub fn apply_actions<A: Borrow<Action>>(text: &str, planned: &[(PiiMatch, A)]) -> String {
    let mut order: Vec<&(PiiMatch, A)> = planned.iter().collect();
    order.sort_by(|a, b| b.0.start.cmp(&a.0.start));

    let mut output = text.to_string();
    for (matched, action) in order {
        debug_assert!(matched.is_valid_for(text));
        let replacement = action.borrow().render(matched.slice(text));
        output.replace_range(matched.start..matched.end, &replacement);
    }
    output
}

/// Rewrite kept spans that contain an already redacted value
///
/// The value is replaced inside the kept text with the output of the action
/// that redacted it. Other spans keep the action their policy resolved to.
fn shield_kept_spans<'a>(
    text: &str,
    resolved: Vec<(PiiMatch, &'a Action)>,
    redacted_values: &[(String, Action)],
) -> Vec<(PiiMatch, Cow<'a, Action>)> {
    resolved
        .into_iter()
        .map(|(matched, action)| {
            if action.is_redacting() {
                return (matched, Cow::Borrowed(action));
            }
            let kept = matched.slice(text);
            let mut leaking: Vec<&(String, Action)> = redacted_values
                .iter()
                .filter(|(value, _)| kept.contains(value.as_str()))
                .collect();
            if leaking.is_empty() {
                return (matched, Cow::Borrowed(action));
            }

            // Longest first, so a value that contains another is rewritten whole
            leaking.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
            let mut shielded = kept.to_string();
            for (value, redacting) in leaking {
                let replacement = redacting.render(value).into_owned();
                shielded = shielded.replace(value.as_str(), &replacement);
            }
            (matched, Cow::Owned(Action::replace(shielded)))
        })
        .collect()
}

/// Count spans their policy redacts; kept and shielded spans are not counted
fn tally_redactions(
    counts: &mut BTreeMap<String, usize>,
    planned: &[(PiiMatch, Cow<'_, Action>)],
) {
    for (matched, action) in planned {
        if let Cow::Borrowed(policy_action) = action {
            if policy_action.is_redacting() {
                *counts
                    .entry(matched.entity_type.label().to_string())
                    .or_insert(0) += 1;
            }
        }
    }
}

fn format_counts(counts: &BTreeMap<String, usize>) -> String {
    counts
        .iter()
        .map(|(label, count)| format!("{label}={count}"))
        .collect::<Vec<_>>()
        .join(",")
}
