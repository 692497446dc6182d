//! Run orchestration: locking, feature switches, audit, and the cycle
//! driver tying validation and decision together.
//!
//! One cycle: global switch check (bypassed by `force_run`) → lock
//! acquisition (global or per symbol) → per-symbol validation + decision
//! (decision skipped under `dry_run`) → summary aggregation → audit →
//! lock release. Early terminations are distinct run statuses on empty
//! summaries, never errors.

mod audit;
mod lock;
mod run;
mod switch;

pub use audit::{AuditLogger, TracingAuditLogger};
pub use lock::{InMemoryLockStore, LockManager, LockStore};
pub use run::{RunConfig, RunOptions, RunOrchestrator};
pub use switch::{symbol_gate, FeatureSwitch, GLOBAL_TRADING};
