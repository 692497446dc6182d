//! Shared domain types for the MTF decision core.
//!
//! This crate holds the types every stage of the pipeline exchanges:
//!
//! - **Timeframes and sides**: `Timeframe`, `SignalSide`
//! - **Indicator snapshots**: `IndicatorContext` (scalar values + raw series)
//! - **Per-symbol outcomes**: `SymbolResult`, `SymbolStatus`, `SymbolError`
//! - **Run outcomes**: `RunSummary`, `RunStatus`
//! - **Trade requests**: `TradeEntryRequest`, `StopFrom`, `TakeProfitPolicy`
//! - **Cooldowns**: `CooldownRequest`

mod cooldown;
mod indicators;
mod result;
mod side;
mod timeframe;
mod trade;

pub use cooldown::CooldownRequest;
pub use indicators::IndicatorContext;
pub use result::{RunStatus, RunSummary, SymbolError, SymbolResult, SymbolStatus};
pub use side::SignalSide;
pub use timeframe::{ParseTimeframeError, Timeframe};
pub use trade::{StopFrom, TakeProfitPolicy, TradeEntryRequest};
