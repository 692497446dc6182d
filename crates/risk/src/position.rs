//! Position sizing.

use rust_decimal::Decimal;

use crate::error::SizingError;

/// `size = floor(risk_usdt / (distance * contract_size))`, in whole
/// contracts.
///
/// Rejects (fatal for the request, never retried) when the denominator is
/// not positive or the result is below the instrument minimum.
pub fn position_size(
    risk_usdt: Decimal,
    distance: Decimal,
    contract_size: Decimal,
    min_size: Decimal,
) -> Result<Decimal, SizingError> {
    let denom = distance * contract_size;
    if denom <= Decimal::ZERO {
        return Err(SizingError::NonPositive {
            what: "size denominator",
            value: denom,
        });
    }

    let size = (risk_usdt / denom).floor();
    if size < min_size {
        return Err(SizingError::BelowMinimumSize {
            computed: size,
            minimum: min_size,
        });
    }
    Ok(size)
}
