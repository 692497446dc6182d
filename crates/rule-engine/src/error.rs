//! Rule engine error types.

use thiserror::Error;

/// Errors raised while parsing or evaluating rule trees.
///
/// Only configuration problems surface as errors; a leaf that lacks market
/// data fails its condition instead (fail-closed, recorded in the result
/// meta).
#[derive(Debug, Error)]
pub enum RuleError {
    /// A `NamedRef` pointed at a rule the registry does not hold.
    #[error("unknown rule '{0}'")]
    UnknownRule(String),

    /// A rule definition could not be parsed into a node.
    #[error("invalid rule config: {0}")]
    InvalidConfig(String),
}
