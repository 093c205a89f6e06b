//! Policy engine: one redaction policy per named context

use super::{Action, RedactionPolicy};
use crate::anonymization::models::EntityType;
use crate::domain::{AnonymizationError, PolicyContext, RedactorError, Result};
use std::collections::{BTreeMap, HashMap};

/// Process-wide table of redaction policies
///
/// Built once at startup; all lookups take `&self`, so the engine can be
/// shared across concurrent requests without locking.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    policies: HashMap<PolicyContext, RedactionPolicy>,
}

impl PolicyEngine {
    /// Engine with only the built-in `verbatim` and `plain` contexts
    pub fn builtin() -> Self {
        let mut policies = HashMap::new();
        policies.insert(PolicyContext::verbatim(), RedactionPolicy::verbatim());
        policies.insert(PolicyContext::plain(), RedactionPolicy::plain());
        Self { policies }
    }

    /// Built-in contexts plus operator-defined ones
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a custom policy redefines a
    /// built-in context, uses an empty replacement token, or masks with an
    /// alphanumeric or whitespace character.
    pub fn with_custom(custom: &BTreeMap<String, RedactionPolicy>) -> Result<Self> {
        let mut engine = Self::builtin();

        for (name, policy) in custom {
            let context = PolicyContext::new(name.trim());
            if context.as_str().is_empty() {
                return Err(RedactorError::Configuration(
                    "Policy context names cannot be empty".to_string(),
                ));
            }
            if engine.policies.contains_key(&context) {
                return Err(RedactorError::Configuration(format!(
                    "Policy context '{context}' is built in and cannot be redefined"
                )));
            }
            validate_policy(&context, policy)?;
            engine.policies.insert(context, policy.clone());
        }

        Ok(engine)
    }

    /// Action for `entity_type` under `context`
    ///
    /// Types without an explicit entry get the context's default action.
    /// That is expected for built-in types; for a type this build does not
    /// know it signals a configuration gap and is logged, but still never
    /// fails the request.
    pub fn resolve(
        &self,
        entity_type: &EntityType,
        context: &PolicyContext,
    ) -> std::result::Result<&Action, AnonymizationError> {
        let policy = self
            .policies
            .get(context)
            .ok_or_else(|| AnonymizationError::InvalidFieldContext(context.to_string()))?;

        let (action, explicit) = policy.action_for(entity_type);
        if !explicit && !entity_type.is_builtin() {
            tracing::warn!(
                entity_type = %entity_type,
                context = %context,
                action = action.kind(),
                "Unknown entity type has no policy entry; applying context default"
            );
        }
        Ok(action)
    }

    /// Policy registered for `context`
    pub fn policy(&self, context: &PolicyContext) -> Option<&RedactionPolicy> {
        self.policies.get(context)
    }

    /// Whether `context` has a registered policy
    pub fn has_context(&self, context: &PolicyContext) -> bool {
        self.policies.contains_key(context)
    }

    /// Registered contexts, sorted by name
    pub fn contexts(&self) -> Vec<&PolicyContext> {
        let mut contexts: Vec<&PolicyContext> = self.policies.keys().collect();
        contexts.sort();
        contexts
    }

    /// Every distinct replacement token across all policies
    pub fn replacement_tokens(&self) -> Vec<&str> {
        let mut tokens: Vec<&str> = self
            .policies
            .values()
            .flat_map(|p| p.actions())
            .filter_map(|a| match a {
                Action::Replace { token } => Some(token.as_str()),
                _ => None,
            })
            .collect();
        tokens.sort_unstable();
        tokens.dedup();
        tokens
    }
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validate_policy(context: &PolicyContext, policy: &RedactionPolicy) -> Result<()> {
    for action in policy.actions() {
        match action {
            Action::Replace { token } if token.is_empty() => {
                return Err(RedactorError::Configuration(format!(
                    "Policy '{context}' uses an empty replacement token"
                )));
            }
            Action::Mask { mask_char } if mask_char.is_alphanumeric() || mask_char.is_whitespace() => {
                return Err(RedactorError::Configuration(format!(
                    "Policy '{context}' masks with {mask_char:?}; mask characters must be punctuation or symbols"
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_contexts() {
        let engine = PolicyEngine::builtin();
        let names: Vec<&str> = engine.contexts().iter().map(|c| c.as_str()).collect();
        assert_eq!(names, vec!["plain", "verbatim"]);
    }

    #[test]
    fn test_resolve_verbatim_keeps_url() {
        let engine = PolicyEngine::builtin();
        let verbatim = PolicyContext::verbatim();
        assert_eq!(engine.resolve(&EntityType::Url, &verbatim).unwrap(), &Action::Keep);
        assert_eq!(
            engine.resolve(&EntityType::Email, &verbatim).unwrap(),
            &Action::redacted()
        );
    }

    #[test]
    fn test_resolve_plain_replaces_everything() {
        let engine = PolicyEngine::builtin();
        let plain = PolicyContext::plain();
        for t in [EntityType::Url, EntityType::Email, EntityType::Ssn] {
            assert_eq!(engine.resolve(&t, &plain).unwrap(), &Action::redacted());
        }
    }

    #[test]
    fn test_unknown_entity_type_gets_default() {
        let engine = PolicyEngine::builtin();
        let action = engine
            .resolve(
                &EntityType::Custom("EMPLOYEE_BADGE".to_string()),
                &PolicyContext::verbatim(),
            )
            .unwrap();
        assert_eq!(action, &Action::redacted());
    }

    #[test]
    fn test_unknown_context_is_invalid() {
        let engine = PolicyEngine::builtin();
        let result = engine.resolve(&EntityType::Email, &PolicyContext::new("structured"));
        assert!(matches!(
            result,
            Err(AnonymizationError::InvalidFieldContext(ref c)) if c == "structured"
        ));
    }

    #[test]
    fn test_custom_policy_registered() {
        let mut custom = BTreeMap::new();
        custom.insert(
            "support-notes".to_string(),
            RedactionPolicy::new(Action::mask('*')).with_action(EntityType::Url, Action::Keep),
        );
        let engine = PolicyEngine::with_custom(&custom).unwrap();
        let ctx = PolicyContext::new("support-notes");
        assert_eq!(engine.resolve(&EntityType::Phone, &ctx).unwrap(), &Action::mask('*'));
        assert_eq!(engine.contexts().len(), 3);
    }

    #[test]
    fn test_builtin_cannot_be_redefined() {
        let mut custom = BTreeMap::new();
        custom.insert("plain".to_string(), RedactionPolicy::new(Action::Keep));
        assert!(matches!(
            PolicyEngine::with_custom(&custom),
            Err(RedactorError::Configuration(_))
        ));
    }

    #[test]
    fn test_invalid_mask_char_rejected() {
        let mut custom = BTreeMap::new();
        custom.insert("x".to_string(), RedactionPolicy::new(Action::mask('a')));
        assert!(PolicyEngine::with_custom(&custom).is_err());
    }

    #[test]
    fn test_empty_token_rejected() {
        let mut custom = BTreeMap::new();
        custom.insert("x".to_string(), RedactionPolicy::new(Action::replace("")));
        assert!(PolicyEngine::with_custom(&custom).is_err());
    }

    #[test]
    fn test_replacement_tokens_deduplicated() {
        let engine = PolicyEngine::builtin();
        assert_eq!(engine.replacement_tokens(), vec!["<REDACTED>"]);
    }
}
