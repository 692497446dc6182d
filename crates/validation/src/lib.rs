//! Multi-timeframe signal validation.
//!
//! Builds on `rule-engine` to answer, per symbol: on which timeframes does a
//! long or short signal hold, and with what diagnostics?
//!
//! - `ValidationConfig`: timeframe → side → list of independent "cases"
//!   (a side passes when any case passes)
//! - `MtfValidator`: walks the canonical timeframe order from the configured
//!   start point, evaluating both sides everywhere — no cross-timeframe
//!   short-circuit, the full failure report is part of the contract
//! - `IndicatorProvider`: the port supplying one `IndicatorContext` per
//!   symbol+timeframe

mod config;
mod provider;
mod report;
mod validator;

pub use config::{SideCases, ValidationConfig};
pub use provider::{IndicatorProvider, ProviderError};
pub use report::{MtfReport, SideValidation, TimeframeValidation};
pub use validator::{MtfValidator, ValidationError};
