//! Entity recognition module
//!
//! Provides the trait-based recognition interface, the regex implementation
//! backed by a TOML pattern library, and the overlap resolution every
//! recognizer result goes through.

pub mod overlap;
pub mod patterns;
pub mod regex;

use crate::anonymization::models::PiiMatch;
use crate::domain::AnonymizationError;

pub use overlap::resolve_overlaps;
pub use patterns::PatternRegistry;
pub use regex::RegexRecognizer;

/// Trait for entity recognizer implementations
///
/// Implementations are loaded once at startup and shared read-only across
/// concurrent requests, hence `Send + Sync` and `&self` receivers.
pub trait EntityRecognizer: Send + Sync {
    /// Detect PII spans in `text`, ordered by ascending start offset.
    ///
    /// Matches below [`confidence_threshold`](Self::confidence_threshold)
    /// are discarded. A recognizer that cannot run must return
    /// [`AnonymizationError::RecognitionUnavailable`], never an empty list.
    fn recognize(&self, text: &str, language: &str) -> Result<Vec<PiiMatch>, AnonymizationError>;

    /// Get the confidence threshold for this recognizer
    fn confidence_threshold(&self) -> f32;

    /// Whether `language` can be scanned
    fn supports_language(&self, language: &str) -> bool;

    /// Whether the underlying model is loaded and usable
    fn is_ready(&self) -> bool {
        true
    }

    /// Short name used in logs
    fn name(&self) -> &str;
}
