//! Pattern library for PII recognition

use crate::anonymization::models::EntityType;
use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Post-check applied to each raw regex match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Validator {
    /// Digits must pass the Luhn checksum (payment cards)
    Luhn,
    /// Trailing punctuation is trimmed and the rest must parse as a URL
    Url,
    /// Rejects dotted quads that look like version numbers or networks
    Ipv4,
}

impl Validator {
    /// Returns the accepted length of `matched` in bytes, or `None` to reject.
    ///
    /// The accepted length is never larger than `matched.len()` and always
    /// lands on a char boundary.
    pub fn accept(&self, matched: &str) -> Option<usize> {
        match self {
            Self::Luhn => {
                let digits: String = matched.chars().filter(|c| c.is_ascii_digit()).collect();
                is_valid_luhn(&digits).then_some(matched.len())
            }
            Self::Url => {
                let trimmed = matched.trim_end_matches(|c: char| {
                    matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | ')' | ']' | '}')
                });
                if trimmed.is_empty() {
                    return None;
                }
                let candidate = if trimmed.to_ascii_lowercase().starts_with("www.") {
                    format!("http://{trimmed}")
                } else {
                    trimmed.to_string()
                };
                match url::Url::parse(&candidate) {
                    Ok(parsed) if parsed.host_str().is_some_and(|h| !h.is_empty()) => {
                        Some(trimmed.len())
                    }
                    _ => None,
                }
            }
            Self::Ipv4 => (!is_likely_version_number(matched)).then_some(matched.len()),
        }
    }
}

/// Luhn checksum over a string of ASCII digits (13 to 19 of them)
fn is_valid_luhn(digits: &str) -> bool {
    let digits: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() < 13 || digits.len() > 19 {
        return false;
    }

    let checksum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(idx, &digit)| {
            if idx % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .sum();

    checksum % 10 == 0
}

fn is_likely_version_number(ip: &str) -> bool {
    let parts: Vec<&str> = ip.split('.').collect();
    if parts.len() != 4 {
        return false;
    }
    parts[0] == "0" || parts[3] == "0"
}

/// Pattern definition from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct PatternDefinition {
    /// Regex patterns for this entity type
    pub patterns: Vec<String>,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
    /// Entity type label
    pub category: String,
    /// Languages this definition applies to; absent means all
    #[serde(default)]
    pub languages: Option<Vec<String>>,
    /// Optional post-check
    #[serde(default)]
    pub validator: Option<Validator>,
}

/// Compiled pattern with metadata
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// Name of the library entry this pattern came from
    pub name: String,
    /// Compiled regex
    pub regex: Regex,
    /// Entity type
    pub entity_type: EntityType,
    /// Confidence score
    pub confidence: f32,
    /// Languages this pattern applies to; `None` means all
    pub languages: Option<Vec<String>>,
    /// Optional post-check
    pub validator: Option<Validator>,
}

impl CompiledPattern {
    /// Whether this pattern should run for `language`
    pub fn applies_to(&self, language: &str) -> bool {
        match &self.languages {
            None => true,
            Some(langs) => langs.iter().any(|l| l.eq_ignore_ascii_case(language)),
        }
    }
}

/// Pattern library container
#[derive(Debug, Deserialize)]
struct PatternLibrary {
    // BTreeMap keeps compilation order stable across runs
    patterns: BTreeMap<String, PatternDefinition>,
}

/// Pattern registry for PII recognition
///
/// Loaded once at startup and shared read-only afterwards.
pub struct PatternRegistry {
    patterns: Vec<CompiledPattern>,
    patterns_by_type: HashMap<EntityType, Vec<CompiledPattern>>,
}

impl PatternRegistry {
    /// Create a new pattern registry from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read pattern library: {}",
                path.as_ref().display()
            )
        })?;

        Self::from_toml(&content)
    }

    /// Create a pattern registry from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let library: PatternLibrary =
            toml::from_str(content).context("Failed to parse pattern library TOML")?;

        let mut patterns = Vec::new();
        let mut patterns_by_type: HashMap<EntityType, Vec<CompiledPattern>> = HashMap::new();

        for (name, def) in library.patterns {
            if !(0.0..=1.0).contains(&def.confidence) {
                anyhow::bail!(
                    "Confidence for pattern '{name}' must be between 0.0 and 1.0, got {}",
                    def.confidence
                );
            }
            if def.category.trim().is_empty() {
                anyhow::bail!("Pattern '{name}' has an empty category");
            }
            let entity_type = EntityType::parse(&def.category);

            for pattern_str in &def.patterns {
                let regex = Regex::new(pattern_str)
                    .with_context(|| format!("Invalid regex in pattern '{name}': {pattern_str}"))?;

                let compiled = CompiledPattern {
                    name: name.clone(),
                    regex,
                    entity_type: entity_type.clone(),
                    confidence: def.confidence,
                    languages: def.languages.clone(),
                    validator: def.validator,
                };

                patterns.push(compiled.clone());
                patterns_by_type
                    .entry(entity_type.clone())
                    .or_default()
                    .push(compiled);
            }
        }

        if patterns.is_empty() {
            anyhow::bail!("Pattern library defines no patterns");
        }

        Ok(Self {
            patterns,
            patterns_by_type,
        })
    }

    /// Create a default pattern registry with built-in patterns
    pub fn default_patterns() -> Result<Self> {
        let default_toml = include_str!("../../../patterns/pii_patterns.toml");
        Self::from_toml(default_toml)
    }

    /// Get all patterns
    pub fn all_patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    /// Get patterns for a specific entity type
    pub fn patterns_for_type(&self, entity_type: &EntityType) -> Option<&[CompiledPattern]> {
        self.patterns_by_type
            .get(entity_type)
            .map(|v| v.as_slice())
    }

    /// Entity types this registry can produce
    pub fn entity_types(&self) -> Vec<EntityType> {
        let mut types: Vec<EntityType> = self.patterns_by_type.keys().cloned().collect();
        types.sort();
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_default_patterns() {
        let registry = PatternRegistry::default_patterns().unwrap();
        assert!(!registry.all_patterns().is_empty());
        for t in [
            EntityType::Email,
            EntityType::Phone,
            EntityType::Ssn,
            EntityType::CreditCard,
            EntityType::IpAddress,
            EntityType::Url,
            EntityType::Person,
        ] {
            assert!(registry.patterns_for_type(&t).is_some(), "missing {t}");
        }
    }

    #[test]
    fn test_email_pattern() {
        let registry = PatternRegistry::default_patterns().unwrap();
        let email_patterns = registry.patterns_for_type(&EntityType::Email).unwrap();

        let pattern = &email_patterns[0];
        assert!(pattern.regex.is_match("test@example.com"));
        assert!(!pattern.regex.is_match("not-an-email"));
    }

    #[test]
    fn test_phone_pattern() {
        let registry = PatternRegistry::default_patterns().unwrap();
        let phone_patterns = registry.patterns_for_type(&EntityType::Phone).unwrap();

        for text in ["Call me at (555) 123-4567", "555-123-4567", "+1 555 123 4567"] {
            assert!(
                phone_patterns.iter().any(|p| p.regex.is_match(text)),
                "no match in {text}"
            );
        }
        assert!(!phone_patterns.iter().any(|p| p.regex.is_match("123-45-6789")));
    }

    #[test]
    fn test_luhn() {
        assert!(is_valid_luhn("4111111111111111"));
        assert!(!is_valid_luhn("4111111111111112"));
        assert!(!is_valid_luhn("4111"));
        assert_eq!(
            Validator::Luhn.accept("4111 1111 1111 1111"),
            Some("4111 1111 1111 1111".len())
        );
    }

    #[test]
    fn test_url_validator_trims_punctuation() {
        assert_eq!(
            Validator::Url.accept("https://docs.example.com)."),
            Some("https://docs.example.com".len())
        );
        assert_eq!(Validator::Url.accept("www.example.org"), Some(15));
        assert_eq!(Validator::Url.accept("https://"), None);
    }

    #[test]
    fn test_ipv4_validator() {
        assert!(Validator::Ipv4.accept("192.168.1.20").is_some());
        assert!(Validator::Ipv4.accept("1.2.3.0").is_none());
        assert!(Validator::Ipv4.accept("0.9.1.4").is_none());
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let toml = r#"
[patterns.bad]
category = "EMAIL"
confidence = 0.9
patterns = ["(unclosed"]
"#;
        assert!(PatternRegistry::from_toml(toml).is_err());
    }

    #[test]
    fn test_confidence_out_of_range_rejected() {
        let toml = r#"
[patterns.bad]
category = "EMAIL"
confidence = 1.5
patterns = ["x"]
"#;
        assert!(PatternRegistry::from_toml(toml).is_err());
    }

    #[test]
    fn test_custom_category() {
        let toml = r#"
[patterns.badge]
category = "EMPLOYEE_BADGE"
confidence = 0.9
patterns = ['\bEMP-\d{6}\b']
"#;
        let registry = PatternRegistry::from_toml(toml).unwrap();
        assert_eq!(
            registry.entity_types(),
            vec![EntityType::Custom("EMPLOYEE_BADGE".to_string())]
        );
    }
}
