//! Decision outcomes.

use serde::{Deserialize, Serialize};

use model::{CooldownRequest, SymbolResult, TradeEntryRequest};

/// Terminal action for one symbol's decision pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionAction {
    /// Nothing to decide (validation error/skip, or not ready).
    None,
    /// A precondition or sizing rejection blocked the trade.
    Skip,
    /// A sized trade request is ready.
    Prepare,
}

/// Named precondition block reasons, stable for the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    MissingExecutionTf,
    UnsupportedExecutionTf,
    MissingSignalSide,
    MissingPriceAndAtr,
    UnableToBuildRequest,
}

impl BlockReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingExecutionTf => "missing_execution_tf",
            Self::UnsupportedExecutionTf => "unsupported_execution_tf",
            Self::MissingSignalSide => "missing_signal_side",
            Self::MissingPriceAndAtr => "missing_price_and_atr",
            Self::UnableToBuildRequest => "unable_to_build_request",
        }
    }
}

/// The full outcome of one decision pass over one symbol.
///
/// `decision_key` is a random correlation token minted once per evaluation
/// for joining audit records across asynchronous stages; it is not a mutex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingDecisionEvaluation {
    pub action: DecisionAction,
    /// The (possibly replaced) symbol result after this pass.
    pub result: SymbolResult,
    pub decision_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_request: Option<TradeEntryRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<BlockReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
    /// Cooldown to apply after a successful live submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<CooldownRequest>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_reason_strings() {
        assert_eq!(
            BlockReason::UnsupportedExecutionTf.as_str(),
            "unsupported_execution_tf"
        );
        assert_eq!(
            BlockReason::UnableToBuildRequest.as_str(),
            "unable_to_build_request"
        );
    }

    #[test]
    fn test_action_serde() {
        assert_eq!(
            serde_json::to_string(&DecisionAction::Prepare).unwrap(),
            "\"prepare\""
        );
    }
}
