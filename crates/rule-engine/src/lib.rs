//! Rule-tree evaluation for trading signal validation.
//!
//! This crate provides the leaf of the decision pipeline:
//!
//! - **Rule nodes**: `RuleNode`, a closed tagged union parsed once from JSON
//!   configuration (`NamedRef` | `AllOf` | `AnyOf` | `Primitive` |
//!   `PermissiveUnknown`)
//! - **Registry**: `ConditionRegistry`, an explicit injected store of named
//!   rule definitions (no global state)
//! - **Evaluator**: `Evaluator`, which walks a node against an
//!   `IndicatorContext` and produces a `ConditionResult` with enough
//!   diagnostic meta to explain every verdict without re-running it
//!
//! # Permissive unknown rules
//!
//! Primitive kinds the engine does not recognize parse into
//! `RuleNode::PermissiveUnknown` and evaluate to `true` with a `warn!`
//! diagnostic. Adding a new rule kind to configuration before the engine
//! supports it must not freeze all trading; the pass-through is an explicit
//! policy, not a fallthrough.

mod error;
mod eval;
mod node;
mod registry;
mod result;

pub use error::RuleError;
pub use eval::Evaluator;
pub use node::{CmpOp, PrevSide, Primitive, RuleNode};
pub use registry::ConditionRegistry;
pub use result::{ConditionMeta, ConditionResult};
