//! Sized trade entry requests produced by the decision service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{SignalSide, Timeframe};

/// Where the stop-loss distance is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopFrom {
    /// `entry ∓ k * ATR` (falls back to `Risk` when no ATR is available).
    Atr,
    /// Distance derived from the risk budget and position size.
    Risk,
    /// Distance anchored to a supplied pivot level.
    Pivot,
}

impl StopFrom {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Atr => "atr",
            Self::Risk => "risk",
            Self::Pivot => "pivot",
        }
    }
}

/// How the take-profit target is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TakeProfitPolicy {
    /// Plain R-multiple of the stop distance.
    RMultiple,
    /// Nearest pivot beyond the R-multiple target.
    PivotConservative,
    /// Pivot up to `max_extra_r` beyond the R-multiple target.
    PivotAggressive,
}

/// A fully sized trade entry request.
///
/// Built once by the decision service, never mutated; consumed by the
/// (out-of-scope) execution layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeEntryRequest {
    pub symbol: String,
    pub side: SignalSide,
    pub execution_tf: Timeframe,
    pub entry_price: Decimal,
    /// Risk fraction of the balance committed to this trade (e.g. 0.01 = 1%).
    pub risk_pct: Decimal,
    /// Margin committed at entry, in quote currency.
    pub initial_margin: Decimal,
    pub leverage: Decimal,
    pub stop_from: StopFrom,
    pub atr: Option<Decimal>,
    pub atr_multiplier: Decimal,
    pub stop_loss_price: Decimal,
    pub take_profit_price: Decimal,
    pub take_profit_policy: TakeProfitPolicy,
    /// Position size in contracts.
    pub size: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_from_strings() {
        assert_eq!(StopFrom::Atr.as_str(), "atr");
        assert_eq!(StopFrom::Risk.as_str(), "risk");
        assert_eq!(StopFrom::Pivot.as_str(), "pivot");
    }

    #[test]
    fn test_policy_serde_names() {
        let json = serde_json::to_string(&TakeProfitPolicy::PivotConservative).unwrap();
        assert_eq!(json, "\"pivot_conservative\"");
        let back: TakeProfitPolicy = serde_json::from_str("\"pivot_aggressive\"").unwrap();
        assert_eq!(back, TakeProfitPolicy::PivotAggressive);
    }
}
