//! Per-symbol and per-run outcome records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{SignalSide, Timeframe};

/// Terminal status of one symbol's evaluation within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolStatus {
    Success,
    Error,
    Skipped,
}

/// Structured error attached to a failed symbol evaluation.
///
/// Surfaced in run summaries instead of raw stack traces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolError {
    /// Stable machine-readable code (e.g. `unknown_rule`).
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

impl SymbolError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// The outcome of one symbol's MTF evaluation.
///
/// Produced once per symbol per run. Immutable after creation; a later stage
/// that needs a different status builds a replacement via [`SymbolResult::into_skipped`]
/// rather than mutating in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolResult {
    pub symbol: String,
    pub status: SymbolStatus,
    /// The timeframe a trade would execute on, when resolved.
    pub execution_tf: Option<Timeframe>,
    /// Confluent signal side, when every evaluated timeframe agrees.
    pub signal_side: Option<SignalSide>,
    pub current_price: Option<Decimal>,
    pub atr: Option<Decimal>,
    /// Decision-stage outcome attached after evaluation (action + reason).
    pub trading_decision: Option<serde_json::Value>,
    pub error: Option<SymbolError>,
}

impl SymbolResult {
    /// A successful evaluation with resolved execution parameters.
    pub fn success(
        symbol: impl Into<String>,
        execution_tf: Timeframe,
        signal_side: Option<SignalSide>,
        current_price: Option<Decimal>,
        atr: Option<Decimal>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            status: SymbolStatus::Success,
            execution_tf: Some(execution_tf),
            signal_side,
            current_price,
            atr,
            trading_decision: None,
            error: None,
        }
    }

    /// A failed evaluation carrying a structured error.
    pub fn error(symbol: impl Into<String>, error: SymbolError) -> Self {
        Self {
            symbol: symbol.into(),
            status: SymbolStatus::Error,
            execution_tf: None,
            signal_side: None,
            current_price: None,
            atr: None,
            trading_decision: None,
            error: Some(error),
        }
    }

    /// A skipped symbol (switch off, or decision-stage precondition block).
    pub fn skipped(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            status: SymbolStatus::Skipped,
            execution_tf: None,
            signal_side: None,
            current_price: None,
            atr: None,
            trading_decision: None,
            error: None,
        }
    }

    /// Build a replacement result with status `Skipped`, keeping the
    /// evaluation context fields.
    pub fn into_skipped(self) -> Self {
        Self {
            status: SymbolStatus::Skipped,
            ..self
        }
    }

    /// Whether the result is ready for the decision stage (both execution
    /// timeframe and a signal side resolved).
    pub fn is_ready(&self) -> bool {
        self.status == SymbolStatus::Success
            && self.execution_tf.is_some()
            && self.signal_side.is_some()
    }
}

/// Terminal status of one orchestrator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    NoActiveSymbols,
    LockAcquisitionFailed,
    GlobalSwitchOff,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::NoActiveSymbols => "no_active_symbols",
            Self::LockAcquisitionFailed => "lock_acquisition_failed",
            Self::GlobalSwitchOff => "global_switch_off",
        }
    }
}

/// Aggregate outcome of one orchestrator cycle over all requested symbols.
///
/// Early-termination statuses (`no_active_symbols`, `lock_acquisition_failed`,
/// `global_switch_off`) carry an otherwise-empty summary and are non-errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub status: RunStatus,
    pub requested: usize,
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    /// successful / processed, 0.0 when nothing was processed.
    pub success_rate: f64,
    pub duration_ms: i64,
    pub results: Vec<SymbolResult>,
}

impl RunSummary {
    /// An empty summary for an early-terminated run.
    pub fn empty(status: RunStatus, requested: usize, duration_ms: i64) -> Self {
        Self {
            status,
            requested,
            processed: 0,
            successful: 0,
            failed: 0,
            skipped: 0,
            success_rate: 0.0,
            duration_ms,
            results: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ready_requires_tf_and_side() {
        let full = SymbolResult::success(
            "BTCUSDT",
            Timeframe::M15,
            Some(SignalSide::Long),
            Some(dec!(50000)),
            Some(dec!(120)),
        );
        assert!(full.is_ready());

        let no_side =
            SymbolResult::success("BTCUSDT", Timeframe::M15, None, Some(dec!(50000)), None);
        assert!(!no_side.is_ready());

        let err = SymbolResult::error("BTCUSDT", SymbolError::new("unknown_rule", "boom"));
        assert!(!err.is_ready());
    }

    #[test]
    fn test_into_skipped_keeps_context() {
        let result = SymbolResult::success(
            "ETHUSDT",
            Timeframe::M5,
            Some(SignalSide::Short),
            Some(dec!(3000)),
            None,
        );

        let skipped = result.into_skipped();
        assert_eq!(skipped.status, SymbolStatus::Skipped);
        assert_eq!(skipped.execution_tf, Some(Timeframe::M5));
        assert_eq!(skipped.current_price, Some(dec!(3000)));
    }

    #[test]
    fn test_run_status_strings() {
        assert_eq!(RunStatus::NoActiveSymbols.as_str(), "no_active_symbols");
        assert_eq!(
            RunStatus::LockAcquisitionFailed.as_str(),
            "lock_acquisition_failed"
        );
        assert_eq!(RunStatus::GlobalSwitchOff.as_str(), "global_switch_off");
    }

    #[test]
    fn test_empty_summary() {
        let summary = RunSummary::empty(RunStatus::GlobalSwitchOff, 3, 12);
        assert_eq!(summary.requested, 3);
        assert_eq!(summary.processed, 0);
        assert!(summary.results.is_empty());
    }
}
