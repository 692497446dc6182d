//! Indicator provider port.

use model::{IndicatorContext, Timeframe};
use thiserror::Error;

/// Errors an indicator provider can report.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No snapshot is available for the symbol+timeframe.
    #[error("no indicator data for {symbol} {timeframe}")]
    NoData {
        symbol: String,
        timeframe: Timeframe,
    },

    /// Underlying data source failure.
    #[error("indicator source error: {0}")]
    Source(String),
}

/// Supplies indicator snapshots to the validator.
///
/// Implemented by out-of-scope collaborators (candle store + TA pipeline);
/// the core only reads the finished per-timeframe snapshot.
pub trait IndicatorProvider {
    fn indicator_context(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<IndicatorContext, ProviderError>;
}
