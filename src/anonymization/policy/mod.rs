//! Redaction policies
//!
//! A [`RedactionPolicy`] maps entity types to an [`Action`] and carries a
//! default for everything it does not list. The [`PolicyEngine`] holds one
//! policy per [`PolicyContext`](crate::domain::PolicyContext) and answers
//! `resolve(entity_type, context)` lookups from the pipeline.

pub mod engine;

use crate::anonymization::models::EntityType;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

pub use engine::PolicyEngine;

/// Fixed replacement token used by the built-in policies
pub const PLACEHOLDER_TOKEN: &str = "<REDACTED>";

fn default_mask_char() -> char {
    '*'
}

/// What to do with a detected span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Substitute a fixed token
    Replace { token: String },
    /// Pass the span through verbatim
    Keep,
    /// Overwrite every character of the span with `mask_char`
    Mask {
        #[serde(default = "default_mask_char")]
        mask_char: char,
    },
}

impl Action {
    /// `Replace` with the given token
    pub fn replace(token: impl Into<String>) -> Self {
        Self::Replace {
            token: token.into(),
        }
    }

    /// `Replace` with [`PLACEHOLDER_TOKEN`]
    pub fn redacted() -> Self {
        Self::replace(PLACEHOLDER_TOKEN)
    }

    /// `Mask` with the given character
    pub fn mask(mask_char: char) -> Self {
        Self::Mask { mask_char }
    }

    /// Whether applying this action removes the original span
    pub fn is_redacting(&self) -> bool {
        !matches!(self, Self::Keep)
    }

    /// Text that replaces `original` in the output
    ///
    /// Masks are as long as the span in characters.
    pub fn render<'a>(&'a self, original: &'a str) -> Cow<'a, str> {
        match self {
            Self::Replace { token } => Cow::Borrowed(token.as_str()),
            Self::Keep => Cow::Borrowed(original),
            Self::Mask { mask_char } => Cow::Owned(
                std::iter::repeat(*mask_char)
                    .take(original.chars().count())
                    .collect(),
            ),
        }
    }

    /// Short name used in logs and reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Replace { .. } => "replace",
            Self::Keep => "keep",
            Self::Mask { .. } => "mask",
        }
    }
}

/// Mapping from entity type to action, with a default for unlisted types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionPolicy {
    /// Explicit per-type actions
    #[serde(default)]
    pub entities: BTreeMap<EntityType, Action>,
    /// Action for any type not listed in `entities`
    pub default: Action,
}

impl RedactionPolicy {
    /// Policy that applies `default` to every type
    pub fn new(default: Action) -> Self {
        Self {
            entities: BTreeMap::new(),
            default,
        }
    }

    /// Adds an explicit action for one entity type
    pub fn with_action(mut self, entity_type: EntityType, action: Action) -> Self {
        self.entities.insert(entity_type, action);
        self
    }

    /// Action for `entity_type`, and whether it came from an explicit entry
    pub fn action_for(&self, entity_type: &EntityType) -> (&Action, bool) {
        match self.entities.get(entity_type) {
            Some(action) => (action, true),
            None => (&self.default, false),
        }
    }

    /// Every action this policy can produce
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.entities.values().chain(std::iter::once(&self.default))
    }

    /// `verbatim`: keep URLs, replace everything else
    pub fn verbatim() -> Self {
        Self::new(Action::redacted()).with_action(EntityType::Url, Action::Keep)
    }

    /// `plain`: replace every detection
    pub fn plain() -> Self {
        Self::new(Action::redacted())
    }
}
