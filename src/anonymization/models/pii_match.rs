//! PII match data models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of personal data a span was recognised as
///
/// The built-in variants are what the bundled pattern library detects. A
/// custom pattern library may introduce any other label; those become
/// [`EntityType::Custom`] and are redacted with the context's default action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityType {
    /// Email addresses
    Email,
    /// Telephone numbers
    Phone,
    /// US Social Security Numbers
    Ssn,
    /// Payment card numbers (Luhn-valid)
    CreditCard,
    /// IPv4 / IPv6 addresses
    IpAddress,
    /// Web URLs
    Url,
    /// Personal names
    Person,
    /// Any label not known to this build
    Custom(String),
}

impl EntityType {
    /// Canonical upper-case label
    pub fn label(&self) -> &str {
        match self {
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
            Self::Ssn => "SSN",
            Self::CreditCard => "CREDIT_CARD",
            Self::IpAddress => "IP_ADDRESS",
            Self::Url => "URL",
            Self::Person => "PERSON",
            Self::Custom(label) => label,
        }
    }

    /// Whether this type is one of the built-in variants
    pub fn is_builtin(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }

    /// Parse a label, accepting common aliases. Unknown labels become
    /// [`EntityType::Custom`] with the label upper-cased.
    pub fn parse(s: &str) -> Self {
        let upper = s.trim().to_uppercase();
        match upper.as_str() {
            "EMAIL" | "EMAIL_ADDRESS" => Self::Email,
            "PHONE" | "PHONE_NUMBER" => Self::Phone,
            "SSN" | "US_SSN" => Self::Ssn,
            "CREDIT_CARD" | "CARD" => Self::CreditCard,
            "IP_ADDRESS" | "IP" => Self::IpAddress,
            "URL" => Self::Url,
            "PERSON" | "NAME" => Self::Person,
            _ => Self::Custom(upper),
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EntityType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for EntityType {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<EntityType> for String {
    fn from(t: EntityType) -> Self {
        t.label().to_string()
    }
}

/// One detected span in the original coordinate space of the input text
///
/// Offsets are UTF-8 byte offsets and always fall on char boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiiMatch {
    /// Inclusive start offset
    pub start: usize,
    /// Exclusive end offset
    pub end: usize,
    /// What the span was recognised as
    pub entity_type: EntityType,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
}

impl PiiMatch {
    /// Create a new match; confidence is clamped to [0, 1]
    pub fn new(start: usize, end: usize, entity_type: EntityType, confidence: f32) -> Self {
        Self {
            start,
            end,
            entity_type,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Span length in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span is empty (never true for a valid match)
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether two spans share at least one byte
    pub fn overlaps(&self, other: &PiiMatch) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether the span is non-empty, in bounds and on char boundaries of `text`
    pub fn is_valid_for(&self, text: &str) -> bool {
        self.start < self.end
            && self.end <= text.len()
            && text.is_char_boundary(self.start)
            && text.is_char_boundary(self.end)
    }

    /// The matched substring; callers must have checked [`Self::is_valid_for`]
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_parse_aliases() {
        assert_eq!(EntityType::parse("email_address"), EntityType::Email);
        assert_eq!(EntityType::parse("URL"), EntityType::Url);
        assert_eq!(EntityType::parse(" name "), EntityType::Person);
        assert_eq!(
            EntityType::parse("employee_id"),
            EntityType::Custom("EMPLOYEE_ID".to_string())
        );
    }

    #[test]
    fn test_entity_type_serde_uses_label() {
        let json = serde_json::to_string(&EntityType::CreditCard).unwrap();
        assert_eq!(json, "\"CREDIT_CARD\"");

        let parsed: EntityType = serde_json::from_str("\"BADGE\"").unwrap();
        assert_eq!(parsed, EntityType::Custom("BADGE".to_string()));
        assert!(!parsed.is_builtin());
    }

    #[test]
    fn test_confidence_clamped() {
        assert_eq!(PiiMatch::new(0, 1, EntityType::Email, 1.7).confidence, 1.0);
        assert_eq!(PiiMatch::new(0, 1, EntityType::Email, -0.2).confidence, 0.0);
    }

    #[test]
    fn test_overlaps() {
        let a = PiiMatch::new(0, 5, EntityType::Email, 0.9);
        let b = PiiMatch::new(4, 8, EntityType::Url, 0.9);
        let c = PiiMatch::new(5, 8, EntityType::Url, 0.9);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_is_valid_for() {
        let text = "héllo";
        assert!(PiiMatch::new(0, 1, EntityType::Person, 1.0).is_valid_for(text));
        // 'é' is two bytes: offset 2 is inside it
        assert!(!PiiMatch::new(0, 2, EntityType::Person, 1.0).is_valid_for(text));
        assert!(!PiiMatch::new(3, 3, EntityType::Person, 1.0).is_valid_for(text));
        assert!(!PiiMatch::new(0, 99, EntityType::Person, 1.0).is_valid_for(text));
    }
}
