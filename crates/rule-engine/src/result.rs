//! Condition evaluation results and diagnostic meta.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Diagnostic data attached to every condition result.
///
/// Carries enough to reconstruct why a leaf passed or failed without
/// re-running it: the computed diffs, the missing field, the failure reason,
/// how many comparisons were made, or how many bars back a cross happened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diffs: Option<Vec<Decimal>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub missing_data: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparisons: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bars_since_cross: Option<usize>,
}

impl ConditionMeta {
    /// Meta for a leaf that failed because an indicator key was absent.
    pub fn missing(field: impl Into<String>) -> Self {
        Self {
            missing_data: true,
            missing_field: Some(field.into()),
            ..Self::default()
        }
    }

    /// Meta carrying only a failure reason string.
    pub fn reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::default()
        }
    }
}

/// The verdict of evaluating one rule node.
///
/// Composite nodes carry their evaluated children in `items`; flattening for
/// failure reports recurses into them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionResult {
    /// Rule name for named refs, kind name for primitives, `all_of`/`any_of`
    /// for composites.
    pub name: String,
    pub passed: bool,
    /// Observed value, when the leaf compared one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Decimal>,
    /// Threshold the value was compared against, when there was one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Decimal>,
    #[serde(default)]
    pub meta: ConditionMeta,
    /// Evaluated children of composite nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ConditionResult>,
}

impl ConditionResult {
    /// A leaf verdict without children.
    pub fn leaf(
        name: impl Into<String>,
        passed: bool,
        value: Option<Decimal>,
        threshold: Option<Decimal>,
        meta: ConditionMeta,
    ) -> Self {
        Self {
            name: name.into(),
            passed,
            value,
            threshold,
            meta,
            items: Vec::new(),
        }
    }

    /// A composite verdict over evaluated children.
    pub fn composite(name: impl Into<String>, passed: bool, items: Vec<ConditionResult>) -> Self {
        Self {
            name: name.into(),
            passed,
            value: None,
            threshold: None,
            meta: ConditionMeta::default(),
            items,
        }
    }

    /// Names of all failed leaves, recursing into composite items.
    pub fn failed_names(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_failed(&mut out);
        out
    }

    fn collect_failed(&self, out: &mut Vec<String>) {
        if self.items.is_empty() {
            if !self.passed {
                out.push(self.name.clone());
            }
        } else {
            for item in &self.items {
                item.collect_failed(out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_failed_names_recurse_into_items() {
        let tree = ConditionResult::composite(
            "all_of",
            false,
            vec![
                ConditionResult::leaf("ema_up", true, Some(dec!(1)), None, ConditionMeta::default()),
                ConditionResult::composite(
                    "any_of",
                    false,
                    vec![
                        ConditionResult::leaf(
                            "macd_positive",
                            false,
                            Some(dec!(-0.2)),
                            Some(dec!(0)),
                            ConditionMeta::default(),
                        ),
                        ConditionResult::leaf(
                            "rsi_overbought",
                            false,
                            None,
                            Some(dec!(70)),
                            ConditionMeta::missing("rsi"),
                        ),
                    ],
                ),
            ],
        );

        assert_eq!(tree.failed_names(), vec!["macd_positive", "rsi_overbought"]);
    }

    #[test]
    fn test_serde_skips_empty_meta() {
        let leaf = ConditionResult::leaf("x", true, None, None, ConditionMeta::default());
        let json = serde_json::to_value(&leaf).unwrap();
        assert!(json.get("items").is_none());
        assert_eq!(json["meta"], serde_json::json!({}));
    }
}
