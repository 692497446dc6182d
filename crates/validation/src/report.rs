//! Validation reports per side, timeframe and symbol.

use serde::{Deserialize, Serialize};

use model::{SignalSide, Timeframe};
use rule_engine::ConditionResult;

/// Verdict for one side on one timeframe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SideValidation {
    pub side: SignalSide,
    pub passed: bool,
    /// Number of configured cases for this side.
    pub requirements: usize,
    /// One result per evaluated case (composite trees with items).
    pub conditions: Vec<ConditionResult>,
    /// Leaf-level names of failed conditions, flattened across cases.
    pub failed: Vec<String>,
}

impl SideValidation {
    /// Build from evaluated case results, deriving `passed` and `failed`.
    pub fn from_cases(side: SignalSide, requirements: usize, conditions: Vec<ConditionResult>) -> Self {
        let passed = conditions.iter().any(|c| c.passed);
        let failed = conditions
            .iter()
            .flat_map(ConditionResult::failed_names)
            .collect();
        Self {
            side,
            passed,
            requirements,
            conditions,
            failed,
        }
    }

    /// An unsatisfied side with no cases configured (fails closed).
    pub fn unconfigured(side: SignalSide) -> Self {
        Self {
            side,
            passed: false,
            requirements: 0,
            conditions: Vec::new(),
            failed: Vec::new(),
        }
    }
}

/// Both sides' verdicts for one timeframe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeframeValidation {
    pub timeframe: Timeframe,
    pub long: SideValidation,
    pub short: SideValidation,
}

impl TimeframeValidation {
    /// The verdict for one side.
    pub fn side(&self, side: SignalSide) -> &SideValidation {
        match side {
            SignalSide::Long => &self.long,
            SignalSide::Short => &self.short,
        }
    }
}

/// Full multi-timeframe validation report for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MtfReport {
    pub symbol: String,
    /// Evaluated timeframes, in canonical order.
    pub timeframes: Vec<TimeframeValidation>,
}

impl MtfReport {
    /// Whether a side passed on every evaluated timeframe.
    ///
    /// False when nothing was evaluated; confluence needs at least one
    /// verdict.
    pub fn side_confluent(&self, side: SignalSide) -> bool {
        !self.timeframes.is_empty() && self.timeframes.iter().all(|tf| tf.side(side).passed)
    }

    /// The side passing on every timeframe, when exactly one does.
    pub fn confluent_side(&self) -> Option<SignalSide> {
        match (
            self.side_confluent(SignalSide::Long),
            self.side_confluent(SignalSide::Short),
        ) {
            (true, false) => Some(SignalSide::Long),
            (false, true) => Some(SignalSide::Short),
            _ => None,
        }
    }

    /// The last (narrowest) evaluated timeframe, used as execution timeframe.
    pub fn execution_timeframe(&self) -> Option<Timeframe> {
        self.timeframes.last().map(|tf| tf.timeframe)
    }
}
