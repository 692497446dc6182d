//! Take-profit targeting with optional pivot substitution.

use rust_decimal::Decimal;

use model::{SignalSide, TakeProfitPolicy};

use crate::tick::{ceil_to_tick, quantize_to_tick};

/// Take-profit policy parameters.
#[derive(Debug, Clone)]
pub struct TakeProfitParams {
    pub policy: TakeProfitPolicy,
    /// Target distance as a multiple of the stop distance.
    pub r_multiple: Decimal,
    /// Candidate pivot levels, sorted ascending. Ignored for `RMultiple`.
    pub pivots: Vec<Decimal>,
    /// For `PivotAggressive`: how far beyond the R-multiple target a pivot
    /// may sit, in extra R.
    pub max_extra_r: Decimal,
    /// Percentage buffer pulling a pivot target back toward entry
    /// (fraction, e.g. 0.001 = 0.1%).
    pub buffer_pct: Decimal,
    /// Fixed tick-count buffer pulling a pivot target back toward entry.
    pub buffer_ticks: Decimal,
    /// Minimum fraction of the theoretical R-multiple a pivot target must
    /// keep; below it the pivot is discarded.
    pub min_keep_ratio: Decimal,
    pub tick: Decimal,
}

/// Compute the take-profit price for a trade.
///
/// Base target is `entry ± r_multiple * risk_distance`. Pivot policies may
/// substitute a pivot beyond the base target, buffered back toward entry;
/// if the buffered pivot keeps less than `min_keep_ratio * r_multiple` of
/// the theoretical distance, the pivot is discarded and the base target
/// stands. The final price is tick-quantized and strictly beyond entry.
pub fn take_profit(
    entry: Decimal,
    stop: Decimal,
    side: SignalSide,
    params: &TakeProfitParams,
) -> Decimal {
    let risk_distance = (entry - stop).abs();
    let base = match side {
        SignalSide::Long => entry + params.r_multiple * risk_distance,
        SignalSide::Short => entry - params.r_multiple * risk_distance,
    };

    let mut target = base;
    if params.policy != TakeProfitPolicy::RMultiple {
        if let Some(pivot) = select_pivot(base, side, risk_distance, params) {
            let buffered = apply_buffers(pivot, side, params);
            let effective_r = if risk_distance > Decimal::ZERO {
                (buffered - entry).abs() / risk_distance
            } else {
                Decimal::ZERO
            };
            if effective_r >= params.min_keep_ratio * params.r_multiple {
                target = buffered;
            }
        }
    }

    let quantized = quantize_to_tick(target, params.tick);
    enforce_beyond_entry(quantized, entry, side, params.tick)
}

/// Pick the pivot the policy prefers among candidates beyond the base
/// target in the favorable direction.
fn select_pivot(
    base: Decimal,
    side: SignalSide,
    risk_distance: Decimal,
    params: &TakeProfitParams,
) -> Option<Decimal> {
    let beyond: Vec<Decimal> = match side {
        SignalSide::Long => params.pivots.iter().copied().filter(|p| *p > base).collect(),
        SignalSide::Short => params.pivots.iter().copied().filter(|p| *p < base).collect(),
    };
    if beyond.is_empty() {
        return None;
    }

    match params.policy {
        // Nearest pivot beyond the base target.
        TakeProfitPolicy::PivotConservative => match side {
            SignalSide::Long => beyond.iter().copied().min(),
            SignalSide::Short => beyond.iter().copied().max(),
        },
        // Furthest pivot within max_extra_r beyond the base target.
        TakeProfitPolicy::PivotAggressive => {
            let limit = params.max_extra_r * risk_distance;
            let eligible = beyond
                .iter()
                .copied()
                .filter(|p| (*p - base).abs() <= limit);
            match side {
                SignalSide::Long => eligible.max(),
                SignalSide::Short => eligible.min(),
            }
        }
        TakeProfitPolicy::RMultiple => None,
    }
}

fn apply_buffers(target: Decimal, side: SignalSide, params: &TakeProfitParams) -> Decimal {
    let pct = target * params.buffer_pct;
    let ticks = params.buffer_ticks * params.tick;
    match side {
        SignalSide::Long => target - pct - ticks,
        SignalSide::Short => target + pct + ticks,
    }
}

fn enforce_beyond_entry(target: Decimal, entry: Decimal, side: SignalSide, tick: Decimal) -> Decimal {
    match side {
        SignalSide::Long if target <= entry => ceil_to_tick(entry + tick, tick),
        SignalSide::Short if target >= entry => {
            crate::tick::floor_to_tick(entry - tick, tick)
        }
        _ => target,
    }
}
