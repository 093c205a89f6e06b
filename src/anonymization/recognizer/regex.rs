//! Regex-based entity recognizer

use super::{overlap::resolve_overlaps, patterns::PatternRegistry, EntityRecognizer};
use crate::anonymization::models::PiiMatch;
use crate::domain::AnonymizationError;
use anyhow::Result;
use std::sync::Arc;

/// Default minimum confidence for a match to be reported
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.7;

/// Regex-based entity recognizer
pub struct RegexRecognizer {
    pattern_registry: Arc<PatternRegistry>,
    confidence_threshold: f32,
    supported_languages: Vec<String>,
}

impl RegexRecognizer {
    /// Create a new regex recognizer with default patterns
    pub fn new() -> Result<Self> {
        let registry = PatternRegistry::default_patterns()?;
        Ok(Self::with_registry(registry))
    }

    /// Create a new regex recognizer with custom pattern registry
    pub fn with_registry(registry: PatternRegistry) -> Self {
        Self {
            pattern_registry: Arc::new(registry),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            supported_languages: vec!["en".to_string()],
        }
    }

    /// Set the confidence threshold
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the languages this recognizer accepts
    pub fn with_supported_languages(mut self, languages: Vec<String>) -> Self {
        self.supported_languages = languages;
        self
    }

    /// The loaded pattern registry
    pub fn registry(&self) -> &PatternRegistry {
        &self.pattern_registry
    }

    /// Raw candidates before overlap resolution
    fn candidates(&self, text: &str, language: &str) -> Vec<PiiMatch> {
        let mut candidates = Vec::new();

        for pattern in self.pattern_registry.all_patterns() {
            if pattern.confidence < self.confidence_threshold || !pattern.applies_to(language) {
                continue;
            }

            for matched in pattern.regex.find_iter(text) {
                let accepted_len = match pattern.validator {
                    Some(validator) => match validator.accept(matched.as_str()) {
                        Some(len) => len,
                        None => continue,
                    },
                    None => matched.len(),
                };
                if accepted_len == 0 {
                    continue;
                }

                candidates.push(PiiMatch::new(
                    matched.start(),
                    matched.start() + accepted_len,
                    pattern.entity_type.clone(),
                    pattern.confidence,
                ));
            }
        }

        candidates
    }
}

impl EntityRecognizer for RegexRecognizer {
    fn recognize(&self, text: &str, language: &str) -> Result<Vec<PiiMatch>, AnonymizationError> {
        if !self.supports_language(language) {
            return Err(AnonymizationError::RecognitionUnavailable(format!(
                "language '{language}' is not supported (supported: {})",
                self.supported_languages.join(", ")
            )));
        }

        Ok(resolve_overlaps(self.candidates(text, language)))
    }

    fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    fn supports_language(&self, language: &str) -> bool {
        self.supported_languages
            .iter()
            .any(|l| l.eq_ignore_ascii_case(language))
    }

    fn name(&self) -> &str {
        "regex"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::models::EntityType;

    fn recognize(text: &str) -> Vec<PiiMatch> {
        RegexRecognizer::new().unwrap().recognize(text, "en").unwrap()
    }

    fn types(matches: &[PiiMatch]) -> Vec<EntityType> {
        matches.iter().map(|m| m.entity_type.clone()).collect()
    }

    #[test]
    fn test_detect_email() {
        let text = "Contact: john.doe@example.com";
        let matches = recognize(text);
        assert_eq!(types(&matches), vec![EntityType::Email]);
        assert_eq!(matches[0].slice(text), "john.doe@example.com");
    }

    #[test]
    fn test_detect_ssn_not_phone() {
        let text = "My SSN is 123-45-6789";
        let matches = recognize(text);
        assert_eq!(types(&matches), vec![EntityType::Ssn]);
        assert_eq!(matches[0].slice(text), "123-45-6789");
    }

    #[test]
    fn test_detect_url_trims_trailing_period() {
        let text = "See https://docs.example.com/setup.";
        let matches = recognize(text);
        assert_eq!(types(&matches), vec![EntityType::Url]);
        assert_eq!(matches[0].slice(text), "https://docs.example.com/setup");
    }

    #[test]
    fn test_detect_credit_card_requires_luhn() {
        assert_eq!(
            types(&recognize("card 4111 1111 1111 1111 ok")),
            vec![EntityType::CreditCard]
        );
        assert!(recognize("card 4111 1111 1111 1112 ok")
            .iter()
            .all(|m| m.entity_type != EntityType::CreditCard));
    }

    #[test]
    fn test_detect_person_with_honorific() {
        let text = "Dr. Alice Johnson helped me";
        let matches = recognize(text);
        assert_eq!(types(&matches), vec![EntityType::Person]);
        assert_eq!(matches[0].slice(text), "Dr. Alice Johnson");
    }

    #[test]
    fn test_results_sorted_and_disjoint() {
        let text = "a@b.com then 555-123-4567 then 10.1.2.3";
        let matches = recognize(text);
        assert_eq!(matches.len(), 3);
        for pair in matches.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn test_placeholder_not_recognized() {
        assert!(recognize("<REDACTED> and <REDACTED>").is_empty());
    }

    #[test]
    fn test_unsupported_language() {
        let recognizer = RegexRecognizer::new().unwrap();
        let result = recognizer.recognize("hola", "es");
        assert!(matches!(
            result,
            Err(AnonymizationError::RecognitionUnavailable(_))
        ));
    }

    #[test]
    fn test_language_scoped_patterns() {
        let recognizer = RegexRecognizer::new()
            .unwrap()
            .with_supported_languages(vec!["en".to_string(), "de".to_string()]);
        // PERSON patterns are English-only
        assert!(recognizer.recognize("Mr. Smith", "de").unwrap().is_empty());
        assert_eq!(recognizer.recognize("Mr. Smith", "en").unwrap().len(), 1);
    }

    #[test]
    fn test_threshold_filters_low_confidence() {
        let recognizer = RegexRecognizer::new()
            .unwrap()
            .with_confidence_threshold(0.8);
        // PHONE (0.75) and PERSON (0.75) fall below 0.8
        assert!(recognizer
            .recognize("Mr. Smith at 555-123-4567", "en")
            .unwrap()
            .is_empty());
        assert_eq!(recognizer.confidence_threshold(), 0.8);
    }
}
