//! Named rule definitions.

use std::collections::HashMap;

use serde_json::Value;

use crate::{RuleError, RuleNode};

/// Store of named, pre-parsed rule definitions.
///
/// Constructed once at startup from configuration and injected into every
/// evaluator; there is no process-wide registry.
#[derive(Debug, Clone, Default)]
pub struct ConditionRegistry {
    rules: HashMap<String, RuleNode>,
}

impl ConditionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from already-parsed nodes.
    pub fn from_rules(rules: HashMap<String, RuleNode>) -> Self {
        Self { rules }
    }

    /// Parse a registry from a JSON object mapping name → rule definition.
    pub fn from_json(value: &Value) -> Result<Self, RuleError> {
        let obj = value
            .as_object()
            .ok_or_else(|| RuleError::InvalidConfig("rules config must be an object".into()))?;

        let mut rules = HashMap::with_capacity(obj.len());
        for (name, def) in obj {
            let node = RuleNode::from_json(def).map_err(|e| {
                RuleError::InvalidConfig(format!("rule '{name}': {e}"))
            })?;
            rules.insert(name.clone(), node);
        }
        Ok(Self { rules })
    }

    /// Insert or replace a named rule.
    pub fn insert(&mut self, name: impl Into<String>, node: RuleNode) {
        self.rules.insert(name.into(), node);
    }

    /// Resolve a name to its definition.
    pub fn get(&self, name: &str) -> Result<&RuleNode, RuleError> {
        self.rules
            .get(name)
            .ok_or_else(|| RuleError::UnknownRule(name.to_string()))
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the registry holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
