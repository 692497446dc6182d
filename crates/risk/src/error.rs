//! Sizing rejection errors.

use rust_decimal::Decimal;
use thiserror::Error;

/// A computed risk/margin/size value the calculators refuse to trade on.
///
/// These are fatal for the request being built (the decision service skips
/// the symbol); they are never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SizingError {
    /// A derived quantity came out zero or negative.
    #[error("computed {what} is not positive: {value}")]
    NonPositive { what: &'static str, value: Decimal },

    /// The computed position size is below the instrument minimum.
    #[error("position size {computed} below instrument minimum {minimum}")]
    BelowMinimumSize { computed: Decimal, minimum: Decimal },
}
