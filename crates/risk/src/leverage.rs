//! Leverage calculation.

use rust_decimal::Decimal;

/// Leverage bounds and the dynamic cap coefficient.
#[derive(Debug, Clone)]
pub struct LeverageParams {
    pub lev_min: Decimal,
    pub lev_max: Decimal,
    /// Dynamic cap numerator: cap = k_dynamic / stop_pct.
    pub k_dynamic: Decimal,
}

/// Denominator floor guarding against division blow-up.
fn floor_denominator(value: Decimal) -> Decimal {
    let min = Decimal::new(1, 9); // 1e-9
    value.max(min)
}

/// `lev = clamp(risk / (stop_pct * budget), lev_min, min(lev_max, k_dynamic / stop_pct))`.
///
/// `stop_pct` and `budget_usdt` are floored at 1e-9 before dividing.
pub fn leverage(
    risk_usdt: Decimal,
    stop_pct: Decimal,
    budget_usdt: Decimal,
    params: &LeverageParams,
) -> Decimal {
    let stop_pct = floor_denominator(stop_pct);
    let budget = floor_denominator(budget_usdt);

    let base = risk_usdt / (stop_pct * budget);
    let dynamic_cap = params.k_dynamic / stop_pct;
    let upper = params.lev_max.min(dynamic_cap);

    base.max(params.lev_min).min(upper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn params() -> LeverageParams {
        LeverageParams {
            lev_min: dec!(1),
            lev_max: dec!(25),
            k_dynamic: dec!(2),
        }
    }

    #[test]
    fn test_documented_formula_vector() {
        // base = 26 / (0.01 * 100) = 26; dynamic cap = 2 / 0.01 = 200;
        // upper = min(25, 200) = 25; result = min(25, max(1, 26)) = 25.
        let lev = leverage(dec!(26), dec!(0.01), dec!(100), &params());
        assert_eq!(lev, dec!(25));
    }

    #[test]
    fn test_dynamic_cap_binds_on_wide_stop() {
        // stop_pct = 0.2 -> dynamic cap = 10, below lev_max.
        let lev = leverage(dec!(500), dec!(0.2), dec!(100), &params());
        assert_eq!(lev, dec!(10));
    }

    #[test]
    fn test_lev_min_floor() {
        let lev = leverage(dec!(0.01), dec!(0.05), dec!(1000), &params());
        assert_eq!(lev, dec!(1));
    }

    #[test]
    fn test_zero_stop_pct_does_not_blow_up() {
        let lev = leverage(dec!(10), Decimal::ZERO, dec!(100), &params());
        // Denominator floored at 1e-9: base is astronomical, capped by lev_max
        // (the dynamic cap is even larger).
        assert_eq!(lev, dec!(25));
    }
}
