//! Feedback submission schema
//!
//! One versioned contract replaces the per-revision endpoint variants: a
//! [`FeedbackSubmission`] is validated, then a [`FieldSchema`] splits it into
//! free-text [`FeedbackField`]s (each bound to a [`PolicyContext`]) and
//! passthrough metadata that is stored unchanged.

use super::errors::RedactorError;
use super::result::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Current submission schema version
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Lowest accepted quality rating
pub const MIN_QUALITY_RATING: u8 = 1;

/// Highest accepted quality rating
pub const MAX_QUALITY_RATING: u8 = 3;

/// Longest accepted free-text field, in characters
pub const MAX_TEXT_FIELD_CHARS: usize = 20_000;

/// Named selector choosing which redaction policy applies to a field
///
/// Contexts are fixed by field name in the [`FieldSchema`]; they are never
/// taken from user input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyContext(String);

impl PolicyContext {
    /// Context for user-written comments: URLs are preserved
    pub const VERBATIM: &'static str = "verbatim";
    /// Context for everything else: every detection is replaced
    pub const PLAIN: &'static str = "plain";

    /// Creates a context selector
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The built-in `verbatim` context
    pub fn verbatim() -> Self {
        Self::new(Self::VERBATIM)
    }

    /// The built-in `plain` context
    pub fn plain() -> Self {
        Self::new(Self::PLAIN)
    }

    /// Returns the context name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PolicyContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A free-text field awaiting redaction
#[derive(Clone, PartialEq)]
pub struct FeedbackField {
    /// Field name in the submission
    pub name: String,
    /// Unredacted text as submitted
    pub raw_text: String,
    /// Policy context used to redact this field
    pub context: PolicyContext,
}

impl FeedbackField {
    /// Creates a field bound to a policy context
    pub fn new(name: impl Into<String>, raw_text: impl Into<String>, context: PolicyContext) -> Self {
        Self {
            name: name.into(),
            raw_text: raw_text.into(),
            context,
        }
    }
}

// Raw text is never printed: it is exactly what we must not leak into logs.
impl fmt::Debug for FeedbackField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedbackField")
            .field("name", &self.name)
            .field("raw_text_len", &self.raw_text.len())
            .field("context", &self.context)
            .finish()
    }
}

/// A field after redaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactedField {
    /// Field name in the submission
    pub name: String,
    /// Redacted text
    pub text: String,
}

/// Document cited by the answer the feedback is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocReference {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub filepath: String,
}

fn default_schema_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}

/// Feedback submitted about one answer
///
/// Unknown keys are rejected so that an unexpected free-text field can
/// never slip past redaction as passthrough metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedbackSubmission {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    pub overall_response_quality: Option<u8>,
    pub overall_document_quality: Option<u8>,

    pub verbatim: Option<String>,
    pub documentation_accuracy_relevance: Option<String>,
    pub question: Option<String>,
    pub answer: Option<String>,

    pub inaccurate_answer: Option<bool>,
    pub missing_info: Option<bool>,
    pub too_long: Option<bool>,
    pub too_short: Option<bool>,
    pub confusing: Option<bool>,
    pub offensive: Option<bool>,
    pub biased: Option<bool>,
    pub outdated: Option<bool>,
    pub repetitive: Option<bool>,
    pub fantastic: Option<bool>,
    pub in_domain: Option<bool>,
    pub allow_contact: Option<bool>,

    pub case_number: Option<String>,
    pub question_id: Option<String>,
    pub answer_id: Option<String>,
    #[serde(rename = "contentIndex")]
    pub content_index: Option<String>,

    #[serde(default)]
    pub top_docs: Vec<DocReference>,
}

impl FeedbackSubmission {
    /// Checks value ranges the type system cannot express
    pub fn validate(&self) -> Result<()> {
        for (name, rating) in [
            ("overall_response_quality", self.overall_response_quality),
            ("overall_document_quality", self.overall_document_quality),
        ] {
            if let Some(r) = rating {
                if !(MIN_QUALITY_RATING..=MAX_QUALITY_RATING).contains(&r) {
                    return Err(RedactorError::Validation(format!(
                        "{name} must be between {MIN_QUALITY_RATING} and {MAX_QUALITY_RATING}, got {r}"
                    )));
                }
            }
        }

        for (name, text) in [
            ("verbatim", &self.verbatim),
            ("documentation_accuracy_relevance", &self.documentation_accuracy_relevance),
            ("question", &self.question),
            ("answer", &self.answer),
        ] {
            if let Some(t) = text {
                let chars = t.chars().count();
                if chars > MAX_TEXT_FIELD_CHARS {
                    return Err(RedactorError::Validation(format!(
                        "{name} exceeds {MAX_TEXT_FIELD_CHARS} characters ({chars})"
                    )));
                }
            }
        }

        Ok(())
    }
}

/// A free-text field declared by a schema version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFieldSpec {
    pub name: &'static str,
    pub context: &'static str,
}

/// Submission split into redaction input and untouched metadata
#[derive(Debug, Clone)]
pub struct SplitSubmission {
    /// Schema version the split was made with
    pub schema_version: u32,
    /// Free-text fields, in schema order
    pub text_fields: Vec<FeedbackField>,
    /// Everything else, unchanged
    pub passthrough: Map<String, Value>,
}

/// Versioned field schema: which fields are free text and under which context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    pub version: u32,
    pub text_fields: Vec<TextFieldSpec>,
}

impl FieldSchema {
    /// Schema version 1
    pub fn v1() -> Self {
        Self {
            version: 1,
            text_fields: vec![
                TextFieldSpec {
                    name: "verbatim",
                    context: PolicyContext::VERBATIM,
                },
                TextFieldSpec {
                    name: "documentation_accuracy_relevance",
                    context: PolicyContext::PLAIN,
                },
                TextFieldSpec {
                    name: "question",
                    context: PolicyContext::PLAIN,
                },
                TextFieldSpec {
                    name: "answer",
                    context: PolicyContext::PLAIN,
                },
            ],
        }
    }

    /// Looks up the schema for a submission's declared version
    pub fn for_version(version: u32) -> Result<Self> {
        match version {
            1 => Ok(Self::v1()),
            other => Err(RedactorError::Validation(format!(
                "Unsupported schema_version {other} (supported: 1..={CURRENT_SCHEMA_VERSION})"
            ))),
        }
    }

    /// Policy context for a named text field, if the field is free text
    pub fn context_for(&self, field: &str) -> Option<PolicyContext> {
        self.text_fields
            .iter()
            .find(|spec| spec.name == field)
            .map(|spec| PolicyContext::new(spec.context))
    }

    /// Splits a submission into text fields and passthrough metadata
    ///
    /// Null text fields carry no content and stay in the passthrough map.
    pub fn split(&self, submission: &FeedbackSubmission) -> Result<SplitSubmission> {
        let mut passthrough = match serde_json::to_value(submission)? {
            Value::Object(map) => map,
            other => {
                return Err(RedactorError::Serialization(format!(
                    "Submission serialized to non-object: {other}"
                )))
            }
        };
        passthrough.remove("schema_version");

        let mut text_fields = Vec::with_capacity(self.text_fields.len());
        for spec in &self.text_fields {
            match passthrough.remove(spec.name) {
                Some(Value::String(text)) => {
                    text_fields.push(FeedbackField::new(
                        spec.name,
                        text,
                        PolicyContext::new(spec.context),
                    ));
                }
                Some(Value::Null) => {
                    passthrough.insert(spec.name.to_string(), Value::Null);
                }
                None => {}
                Some(other) => {
                    return Err(RedactorError::Validation(format!(
                        "Field '{}' must be a string or null, got {other}",
                        spec.name
                    )))
                }
            }
        }

        Ok(SplitSubmission {
            schema_version: self.version,
            text_fields,
            passthrough,
        })
    }
}
