//! Data models shared by the recognizer, policy engine and pipeline

pub mod pii_match;

pub use pii_match::{EntityType, PiiMatch};
