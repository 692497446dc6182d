//! Tick-size quantization helpers.

use rust_decimal::Decimal;

/// Round a price to the nearest tick multiple. A non-positive tick returns
/// the value unchanged.
pub fn quantize_to_tick(value: Decimal, tick: Decimal) -> Decimal {
    if tick <= Decimal::ZERO {
        return value;
    }
    (value / tick).round() * tick
}

/// Round a price down to a tick multiple.
pub fn floor_to_tick(value: Decimal, tick: Decimal) -> Decimal {
    if tick <= Decimal::ZERO {
        return value;
    }
    (value / tick).floor() * tick
}

/// Round a price up to a tick multiple.
pub fn ceil_to_tick(value: Decimal, tick: Decimal) -> Decimal {
    if tick <= Decimal::ZERO {
        return value;
    }
    (value / tick).ceil() * tick
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quantize_nearest() {
        assert_eq!(quantize_to_tick(dec!(100.26), dec!(0.5)), dec!(100.5));
        assert_eq!(quantize_to_tick(dec!(100.24), dec!(0.5)), dec!(100.0));
    }

    #[test]
    fn test_floor_and_ceil() {
        assert_eq!(floor_to_tick(dec!(100.49), dec!(0.5)), dec!(100.0));
        assert_eq!(ceil_to_tick(dec!(100.01), dec!(0.5)), dec!(100.5));
    }

    #[test]
    fn test_zero_tick_passthrough() {
        assert_eq!(quantize_to_tick(dec!(123.456), Decimal::ZERO), dec!(123.456));
    }
}
