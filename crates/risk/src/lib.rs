//! Pure risk and sizing calculators.
//!
//! Numeric building blocks consumed by the trading decision service:
//! leverage clamping, ATR/risk-budget stop-loss placement, pivot-aware
//! take-profit targeting and position sizing. All functions are pure
//! `Decimal` math; rejections surface as `SizingError`, never panics.

mod error;
mod leverage;
mod position;
mod stop_loss;
mod take_profit;
mod tick;

pub use error::SizingError;
pub use leverage::{leverage, LeverageParams};
pub use position::position_size;
pub use stop_loss::{atr_stop, combined_stop, risk_budget_stop};
pub use take_profit::{take_profit, TakeProfitParams};
pub use tick::{ceil_to_tick, floor_to_tick, quantize_to_tick};
