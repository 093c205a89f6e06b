//! Record key types with validation
//!
//! A stored feedback record is addressed by a partition key / row key pair.
//! Both halves are newtypes so they cannot be swapped by accident, and both
//! reject the characters keyed stores traditionally forbid in keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const MAX_KEY_LEN: usize = 255;

fn validate_key(kind: &str, key: &str) -> Result<(), String> {
    if key.trim().is_empty() {
        return Err(format!("{kind} cannot be empty"));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(format!(
            "{kind} exceeds {MAX_KEY_LEN} bytes: {} bytes",
            key.len()
        ));
    }
    if let Some(c) = key
        .chars()
        .find(|c| matches!(c, '/' | '\\' | '#' | '?') || c.is_control())
    {
        return Err(format!("{kind} contains forbidden character {c:?}"));
    }
    Ok(())
}

/// Partition half of a record key
///
/// Feedback records are partitioned by the UTC day they were received.
///
/// # Examples
///
/// ```
/// use feedback_redactor::domain::ids::PartitionKey;
///
/// let key = PartitionKey::new("2026-10-19").unwrap();
/// assert_eq!(key.as_str(), "2026-10-19");
/// assert!(PartitionKey::new("a/b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PartitionKey(String);

impl PartitionKey {
    /// Creates a new PartitionKey from a string
    pub fn new(key: impl Into<String>) -> Result<Self, String> {
        let key = key.into();
        validate_key("Partition key", &key)?;
        Ok(Self(key))
    }

    /// Partition key for records received at `at` (`YYYY-MM-DD`)
    pub fn for_date(at: DateTime<Utc>) -> Self {
        Self(at.format("%Y-%m-%d").to_string())
    }

    /// Returns the partition key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Row half of a record key, unique within its partition
///
/// # Examples
///
/// ```
/// use feedback_redactor::domain::ids::RowKey;
///
/// let a = RowKey::generate();
/// let b = RowKey::generate();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RowKey(String);

impl RowKey {
    /// Creates a new RowKey from a string
    pub fn new(key: impl Into<String>) -> Result<Self, String> {
        let key = key.into();
        validate_key("Row key", &key)?;
        Ok(Self(key))
    }

    /// Generates a fresh random row key (UUID v4)
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the row key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

macro_rules! key_impls {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = String;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl From<$ty> for String {
            fn from(key: $ty) -> Self {
                key.0
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

key_impls!(PartitionKey);
key_impls!(RowKey);

/// Full identifier of a stored feedback record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId {
    /// Partition the record lives in
    pub partition_key: PartitionKey,
    /// Unique row within the partition
    pub row_key: RowKey,
}

impl RecordId {
    /// Creates a record identifier from its two halves
    pub fn new(partition_key: PartitionKey, row_key: RowKey) -> Self {
        Self {
            partition_key,
            row_key,
        }
    }

    /// Fresh identifier for a record received at `at`
    pub fn generate(at: DateTime<Utc>) -> Self {
        Self::new(PartitionKey::for_date(at), RowKey::generate())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.partition_key, self.row_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_partition_key_for_date() {
        let at = Utc.with_ymd_and_hms(2026, 3, 7, 23, 59, 0).unwrap();
        assert_eq!(PartitionKey::for_date(at).as_str(), "2026-03-07");
    }

    #[test]
    fn test_key_rejects_empty_and_forbidden() {
        assert!(PartitionKey::new("").is_err());
        assert!(PartitionKey::new("   ").is_err());
        assert!(RowKey::new("a#b").is_err());
        assert!(RowKey::new("a\\b").is_err());
        assert!(RowKey::new("a?b").is_err());
        assert!(RowKey::new("a\nb").is_err());
        assert!(RowKey::new("x".repeat(MAX_KEY_LEN + 1)).is_err());
    }

    #[test]
    fn test_row_key_generate_is_uuid() {
        let key = RowKey::generate();
        assert!(Uuid::parse_str(key.as_str()).is_ok());
    }

    #[test]
    fn test_record_id_display() {
        let id = RecordId::new(
            PartitionKey::new("2026-10-19").unwrap(),
            RowKey::new("row-1").unwrap(),
        );
        assert_eq!(id.to_string(), "2026-10-19/row-1");
    }

    #[test]
    fn test_record_id_serde_validates() {
        let json = r#"{"partition_key":"2026-10-19","row_key":"abc"}"#;
        let id: RecordId = serde_json::from_str(json).unwrap();
        assert_eq!(id.row_key.as_str(), "abc");

        let bad = r#"{"partition_key":"a/b","row_key":"abc"}"#;
        assert!(serde_json::from_str::<RecordId>(bad).is_err());
    }
}
