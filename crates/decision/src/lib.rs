//! Trading decision service.
//!
//! Consumes one symbol's validated MTF result and resolves it to one of
//! three terminal actions:
//!
//! - `None` — the symbol never reached decision readiness (validation error,
//!   skip, or no execution timeframe/side resolved); nothing to log
//! - `Skip` — a named precondition blocked the trade (`blocked reason` codes
//!   are stable strings for the audit trail)
//! - `Prepare` — a fully sized `TradeEntryRequest` is ready for execution
//!
//! The service is free of I/O: the post-submission cooldown is emitted as a
//! `CooldownRequest` value the orchestrator applies after a live submission
//! reports `submitted`.

mod config;
mod evaluation;
mod service;

pub use config::DecisionConfig;
pub use evaluation::{BlockReason, DecisionAction, TradingDecisionEvaluation};
pub use service::TradingDecisionService;
