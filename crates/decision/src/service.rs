//! Precondition gating and trade request construction.

use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use model::{CooldownRequest, SignalSide, StopFrom, SymbolResult, SymbolStatus, TradeEntryRequest};
use risk::{atr_stop, combined_stop, leverage, position_size, risk_budget_stop, take_profit,
    TakeProfitParams};

use crate::config::DecisionConfig;
use crate::evaluation::{BlockReason, DecisionAction, TradingDecisionEvaluation};

/// Turns a validated symbol result into a trade/no-trade decision.
pub struct TradingDecisionService {
    config: DecisionConfig,
}

impl TradingDecisionService {
    pub fn new(config: DecisionConfig) -> Self {
        Self { config }
    }

    /// Evaluate one symbol result. Never fails: every outcome is a value.
    pub fn evaluate(&self, result: SymbolResult) -> TradingDecisionEvaluation {
        let decision_key = Uuid::new_v4().as_simple().to_string();

        // 1. Not decision-ready: validation already errored/skipped, or
        //    neither an execution timeframe nor a side was resolved.
        if result.status != SymbolStatus::Success
            || (result.execution_tf.is_none() && result.signal_side.is_none())
        {
            return TradingDecisionEvaluation {
                action: DecisionAction::None,
                result,
                decision_key,
                trade_request: None,
                block_reason: None,
                skip_reason: None,
                cooldown: None,
            };
        }

        // 2. Preconditions, first failure wins.
        if let Some(reason) = self.check_preconditions(&result) {
            return self.skip(result, decision_key, reason, None);
        }

        // 3. Build the sized request.
        match self.build_request(&result) {
            Ok(request) => {
                info!(
                    symbol = %request.symbol,
                    side = %request.side,
                    size = %request.size,
                    decision_key = %decision_key,
                    "trade request prepared"
                );
                let cooldown = Some(CooldownRequest::after_submission(&request.symbol));
                let mut result = result;
                result.trading_decision = Some(serde_json::json!({
                    "action": "prepare",
                    "decision_key": &decision_key,
                    "request": &request,
                }));
                TradingDecisionEvaluation {
                    action: DecisionAction::Prepare,
                    result,
                    decision_key,
                    trade_request: Some(request),
                    block_reason: None,
                    skip_reason: None,
                    cooldown,
                }
            }
            Err(message) => self.skip(
                result,
                decision_key,
                BlockReason::UnableToBuildRequest,
                Some(message),
            ),
        }
    }

    fn check_preconditions(&self, result: &SymbolResult) -> Option<BlockReason> {
        let Some(execution_tf) = result.execution_tf else {
            return Some(BlockReason::MissingExecutionTf);
        };
        if !self.config.allowed_execution_tfs.contains(&execution_tf) {
            return Some(BlockReason::UnsupportedExecutionTf);
        }
        if result.signal_side.is_none() {
            return Some(BlockReason::MissingSignalSide);
        }
        if self.config.require_price_or_atr
            && result.current_price.is_none()
            && result.atr.is_none()
        {
            return Some(BlockReason::MissingPriceAndAtr);
        }
        None
    }

    fn skip(
        &self,
        result: SymbolResult,
        decision_key: String,
        reason: BlockReason,
        message: Option<String>,
    ) -> TradingDecisionEvaluation {
        debug!(
            symbol = %result.symbol,
            block_reason = reason.as_str(),
            decision_key = %decision_key,
            "decision skipped"
        );
        let mut result = result.into_skipped();
        result.trading_decision = Some(serde_json::json!({
            "action": "skip",
            "block_reason": reason.as_str(),
            "decision_key": &decision_key,
        }));
        TradingDecisionEvaluation {
            action: DecisionAction::Skip,
            result,
            decision_key,
            trade_request: None,
            block_reason: Some(reason),
            skip_reason: message.or_else(|| Some(reason.as_str().to_string())),
            cooldown: None,
        }
    }

    /// Construct the request; any hard rejection comes back as a message for
    /// the `unable_to_build_request` skip.
    fn build_request(&self, result: &SymbolResult) -> Result<TradeEntryRequest, String> {
        let config = &self.config;
        // Preconditions guarantee these are present.
        let execution_tf = result.execution_tf.ok_or("missing execution timeframe")?;
        let side = result.signal_side.ok_or("missing signal side")?;

        let multiplier = config.risk_multiplier(execution_tf);
        let risk_pct = config.base_risk_pct / Decimal::ONE_HUNDRED * multiplier;
        if risk_pct <= Decimal::ZERO {
            return Err(format!("non-positive risk pct {risk_pct}"));
        }

        let initial_margin = config
            .fixed_notional
            .unwrap_or(config.fallback_balance * risk_pct);
        if initial_margin <= Decimal::ZERO {
            return Err(format!("non-positive initial margin {initial_margin}"));
        }

        let entry = result
            .current_price
            .ok_or("no current price to size against")?;

        // ATR stop policy silently falls back to the risk policy when no
        // usable ATR is available; missing ATR alone must never hard-fail.
        let valid_atr = result.atr.filter(|atr| *atr > Decimal::ZERO);
        let stop_from = match (config.stop_from, valid_atr) {
            (StopFrom::Atr, None) => {
                debug!(symbol = %result.symbol, "no valid ATR, falling back to risk stop");
                StopFrom::Risk
            }
            (requested, _) => requested,
        };

        let risk_usdt = initial_margin;
        let stop_loss_price = self.resolve_stop(entry, side, stop_from, valid_atr, risk_usdt)?;
        let distance = (entry - stop_loss_price).abs();

        let size = position_size(risk_usdt, distance, config.contract_size, config.min_size)
            .map_err(|e| e.to_string())?;

        let stop_pct = if entry > Decimal::ZERO {
            distance / entry
        } else {
            Decimal::ZERO
        };
        let lev = leverage(risk_usdt, stop_pct, config.fallback_balance, &config.leverage);

        let tp_params = TakeProfitParams {
            policy: config.take_profit_policy,
            r_multiple: config.r_multiple,
            pivots: config.pivot_levels.clone(),
            max_extra_r: config.max_extra_r,
            buffer_pct: config.tp_buffer_pct,
            buffer_ticks: config.tp_buffer_ticks,
            min_keep_ratio: config.tp_min_keep_ratio,
            tick: config.tick_size,
        };
        let take_profit_price = take_profit(entry, stop_loss_price, side, &tp_params);

        Ok(TradeEntryRequest {
            symbol: result.symbol.clone(),
            side,
            execution_tf,
            entry_price: entry,
            risk_pct,
            initial_margin,
            leverage: lev,
            stop_from,
            atr: valid_atr,
            atr_multiplier: config.atr_multiplier,
            stop_loss_price,
            take_profit_price,
            take_profit_policy: config.take_profit_policy,
            size,
        })
    }

    /// Resolve the stop price for the effective policy. When both an ATR
    /// stop and a risk-budget stop are available, the more conservative of
    /// the two wins.
    fn resolve_stop(
        &self,
        entry: Decimal,
        side: SignalSide,
        stop_from: StopFrom,
        valid_atr: Option<Decimal>,
        risk_usdt: Decimal,
    ) -> Result<Decimal, String> {
        let config = &self.config;
        match stop_from {
            StopFrom::Atr => {
                let atr = valid_atr.ok_or("atr policy without atr")?;
                let atr_sl = atr_stop(entry, atr, config.atr_multiplier, side, config.tick_size);
                let atr_distance = (entry - atr_sl).abs();
                let prelim_size =
                    position_size(risk_usdt, atr_distance, config.contract_size, config.min_size)
                        .map_err(|e| e.to_string())?;
                let risk_sl = risk_budget_stop(
                    entry,
                    risk_usdt,
                    config.contract_size,
                    prelim_size,
                    side,
                    config.tick_size,
                )
                .map_err(|e| e.to_string())?;
                Ok(combined_stop(side, atr_sl, risk_sl))
            }
            StopFrom::Risk | StopFrom::Pivot => {
                let distance = entry * config.default_stop_pct;
                if distance <= Decimal::ZERO {
                    return Err(format!("non-positive stop distance {distance}"));
                }
                // Reuse the ATR placement math with the fixed distance.
                Ok(atr_stop(entry, distance, Decimal::ONE, side, config.tick_size))
            }
        }
    }
}
