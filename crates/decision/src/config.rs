//! Decision service configuration.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use model::{StopFrom, TakeProfitPolicy, Timeframe};
use risk::LeverageParams;

/// Configuration for turning a validated signal into a sized trade request.
#[derive(Debug, Clone)]
pub struct DecisionConfig {
    /// Execution timeframes trades may be entered on.
    pub allowed_execution_tfs: Vec<Timeframe>,
    /// Base risk per trade, in percent (1.0 = 1%).
    pub base_risk_pct: Decimal,
    /// Per-timeframe risk multiplier; unlisted timeframes use 1.
    pub risk_multipliers: HashMap<Timeframe, Decimal>,
    /// Fixed notional override for the initial margin; when unset, margin is
    /// `fallback_balance * risk_pct`.
    pub fixed_notional: Option<Decimal>,
    /// Balance used when no live balance is wired in.
    pub fallback_balance: Decimal,
    /// When false, the price/ATR availability precondition is skipped.
    pub require_price_or_atr: bool,
    /// Requested stop derivation policy.
    pub stop_from: StopFrom,
    /// ATR multiple for ATR-derived stops.
    pub atr_multiplier: Decimal,
    /// Stop distance as a fraction of entry for the risk policy.
    pub default_stop_pct: Decimal,
    pub take_profit_policy: TakeProfitPolicy,
    pub r_multiple: Decimal,
    /// Candidate pivot levels (ascending) for pivot take-profit policies.
    pub pivot_levels: Vec<Decimal>,
    pub max_extra_r: Decimal,
    pub tp_buffer_pct: Decimal,
    pub tp_buffer_ticks: Decimal,
    pub tp_min_keep_ratio: Decimal,
    pub leverage: LeverageParams,
    /// Instrument parameters.
    pub contract_size: Decimal,
    pub tick_size: Decimal,
    pub min_size: Decimal,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            allowed_execution_tfs: vec![Timeframe::M15, Timeframe::M5],
            base_risk_pct: dec!(1),
            risk_multipliers: HashMap::new(),
            fixed_notional: None,
            fallback_balance: dec!(1000),
            require_price_or_atr: true,
            stop_from: StopFrom::Atr,
            atr_multiplier: dec!(1.5),
            default_stop_pct: dec!(0.01),
            take_profit_policy: TakeProfitPolicy::RMultiple,
            r_multiple: dec!(2),
            pivot_levels: Vec::new(),
            max_extra_r: dec!(1),
            tp_buffer_pct: Decimal::ZERO,
            tp_buffer_ticks: Decimal::ZERO,
            tp_min_keep_ratio: dec!(0.8),
            leverage: LeverageParams {
                lev_min: dec!(1),
                lev_max: dec!(25),
                k_dynamic: dec!(2),
            },
            contract_size: dec!(0.001),
            tick_size: dec!(0.5),
            min_size: dec!(1),
        }
    }
}

impl DecisionConfig {
    /// Risk multiplier for a timeframe (1 when unconfigured).
    pub fn risk_multiplier(&self, timeframe: Timeframe) -> Decimal {
        self.risk_multipliers
            .get(&timeframe)
            .copied()
            .unwrap_or(Decimal::ONE)
    }
}
