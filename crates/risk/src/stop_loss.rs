//! Stop-loss placement.

use rust_decimal::Decimal;

use model::SignalSide;

use crate::error::SizingError;
use crate::tick::{ceil_to_tick, floor_to_tick, quantize_to_tick};

/// ATR-based stop: `entry ∓ k * atr`, tick-quantized.
///
/// If quantization collapses the stop onto or past the entry, it is
/// re-quantized at least one tick away in the correct direction.
pub fn atr_stop(
    entry: Decimal,
    atr: Decimal,
    k: Decimal,
    side: SignalSide,
    tick: Decimal,
) -> Decimal {
    let raw = match side {
        SignalSide::Long => entry - k * atr,
        SignalSide::Short => entry + k * atr,
    };
    enforce_correct_side(quantize_to_tick(raw, tick), entry, side, tick)
}

/// Risk-budget stop: distance derived from `risk_usdt / (contract_size * size)`.
pub fn risk_budget_stop(
    entry: Decimal,
    risk_usdt: Decimal,
    contract_size: Decimal,
    size: Decimal,
    side: SignalSide,
    tick: Decimal,
) -> Result<Decimal, SizingError> {
    let denom = contract_size * size;
    if denom <= Decimal::ZERO {
        return Err(SizingError::NonPositive {
            what: "stop distance denominator",
            value: denom,
        });
    }
    let distance = risk_usdt / denom;
    if distance <= Decimal::ZERO {
        return Err(SizingError::NonPositive {
            what: "stop distance",
            value: distance,
        });
    }

    let raw = match side {
        SignalSide::Long => entry - distance,
        SignalSide::Short => entry + distance,
    };
    Ok(enforce_correct_side(
        quantize_to_tick(raw, tick),
        entry,
        side,
        tick,
    ))
}

/// The more conservative of two available stops: `min` for longs, `max` for
/// shorts.
pub fn combined_stop(side: SignalSide, a: Decimal, b: Decimal) -> Decimal {
    match side {
        SignalSide::Long => a.min(b),
        SignalSide::Short => a.max(b),
    }
}

/// A stop must sit strictly on the protective side of entry. Re-quantize one
/// tick away when rounding collapsed it.
fn enforce_correct_side(stop: Decimal, entry: Decimal, side: SignalSide, tick: Decimal) -> Decimal {
    match side {
        SignalSide::Long if stop >= entry => floor_to_tick(entry - tick, tick),
        SignalSide::Short if stop <= entry => ceil_to_tick(entry + tick, tick),
        _ => stop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_atr_stop_long() {
        // 50000 - 1.5 * 120 = 49820, already on the 0.5 tick grid.
        let stop = atr_stop(dec!(50000), dec!(120), dec!(1.5), SignalSide::Long, dec!(0.5));
        assert_eq!(stop, dec!(49820.0));
    }

    #[test]
    fn test_atr_stop_short() {
        let stop = atr_stop(dec!(50000), dec!(120), dec!(1.5), SignalSide::Short, dec!(0.5));
        assert_eq!(stop, dec!(50180.0));
    }

    #[test]
    fn test_quantization_collapse_repaired() {
        // Tiny ATR: raw stop 99.99 quantizes to 100 == entry; must be pushed
        // one tick below for a long.
        let stop = atr_stop(dec!(100), dec!(0.01), dec!(1), SignalSide::Long, dec!(1));
        assert!(stop < dec!(100));
        assert_eq!(stop, dec!(99));

        let stop = atr_stop(dec!(100), dec!(0.01), dec!(1), SignalSide::Short, dec!(1));
        assert!(stop > dec!(100));
        assert_eq!(stop, dec!(101));
    }

    #[test]
    fn test_risk_budget_stop_distance() {
        // distance = 50 / (1 * 10) = 5.
        let stop =
            risk_budget_stop(dec!(1000), dec!(50), dec!(1), dec!(10), SignalSide::Long, dec!(0.5))
                .unwrap();
        assert_eq!(stop, dec!(995.0));
    }

    #[test]
    fn test_risk_budget_stop_rejects_zero_size() {
        let err = risk_budget_stop(
            dec!(1000),
            dec!(50),
            dec!(1),
            Decimal::ZERO,
            SignalSide::Long,
            dec!(0.5),
        )
        .unwrap_err();
        assert!(matches!(err, SizingError::NonPositive { .. }));
    }

    #[test]
    fn test_combined_stop_picks_conservative() {
        assert_eq!(
            combined_stop(SignalSide::Long, dec!(995), dec!(990)),
            dec!(990)
        );
        assert_eq!(
            combined_stop(SignalSide::Short, dec!(1005), dec!(1010)),
            dec!(1010)
        );
    }
}
