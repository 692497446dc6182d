//! Validation configuration: cases per timeframe and side.

use std::collections::HashMap;

use serde::Deserialize;

use model::{SignalSide, Timeframe};
use rule_engine::RuleNode;

/// The case lists for one timeframe.
///
/// A side is satisfied when **any** of its cases evaluates true (OR of
/// ANDs). A side with no cases is never satisfied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SideCases {
    #[serde(default)]
    pub long: Vec<RuleNode>,
    #[serde(default)]
    pub short: Vec<RuleNode>,
}

impl SideCases {
    /// The cases configured for one side.
    pub fn for_side(&self, side: SignalSide) -> &[RuleNode] {
        match side {
            SignalSide::Long => &self.long,
            SignalSide::Short => &self.short,
        }
    }
}

/// Ordered per-timeframe validation requirements.
///
/// Loaded once per process lifetime and treated as immutable. Evaluation
/// order comes from `Timeframe::ORDERED`, sliced at `start_from`.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub timeframes: HashMap<Timeframe, SideCases>,
    /// First timeframe to evaluate; earlier (wider) ones are skipped.
    #[serde(default = "default_start")]
    pub start_from: Timeframe,
}

fn default_start() -> Timeframe {
    Timeframe::H4
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            timeframes: HashMap::new(),
            start_from: default_start(),
        }
    }
}

impl ValidationConfig {
    /// Timeframes to evaluate, in canonical order, keeping only those with
    /// configuration present.
    pub fn evaluation_order(&self) -> Vec<Timeframe> {
        Timeframe::from_start(self.start_from)
            .iter()
            .copied()
            .filter(|tf| self.timeframes.contains_key(tf))
            .collect()
    }

    /// The case lists configured for a timeframe, if any.
    pub fn cases(&self, timeframe: Timeframe) -> Option<&SideCases> {
        self.timeframes.get(&timeframe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> ValidationConfig {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_evaluation_order_respects_start_and_presence() {
        let config = parse(serde_json::json!({
            "start_from": "1h",
            "timeframes": {
                "4h": { "long": [ { "kind": "scalar_cmp", "gt": 50 } ] },
                "1h": { "long": [ { "kind": "scalar_cmp", "gt": 50 } ] },
                "5m": { "short": [ { "kind": "scalar_cmp", "lt": 30 } ] }
            }
        }));

        // 4h is configured but before start_from; 15m/1m are not configured.
        assert_eq!(
            config.evaluation_order(),
            vec![Timeframe::H1, Timeframe::M5]
        );
    }

    #[test]
    fn test_default_start_is_4h() {
        let config = parse(serde_json::json!({ "timeframes": {} }));
        assert_eq!(config.start_from, Timeframe::H4);
        assert!(config.evaluation_order().is_empty());
    }

    #[test]
    fn test_side_cases_lookup() {
        let config = parse(serde_json::json!({
            "timeframes": {
                "15m": {
                    "long": [ { "kind": "scalar_cmp", "gt": 50 } ],
                    "short": []
                }
            }
        }));

        let cases = config.cases(Timeframe::M15).unwrap();
        assert_eq!(cases.for_side(SignalSide::Long).len(), 1);
        assert!(cases.for_side(SignalSide::Short).is_empty());
    }
}
