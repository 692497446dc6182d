//! Symbol cooldown requests emitted by the decision and lifecycle stages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A request to pause processing of one symbol for a fixed window.
///
/// The decision and lifecycle services emit these as plain values; the
/// orchestrator applies them to the feature-switch store. Keeping the
/// side effect out of the emitting service keeps it I/O-free and testable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownRequest {
    pub symbol: String,
    /// How long the symbol stays disabled.
    pub window: Duration,
    /// Why the cooldown was requested (e.g. `entry_submitted`,
    /// `protective_filled`).
    pub reason: String,
}

impl CooldownRequest {
    /// The 15-minute post-submission cooldown.
    pub fn after_submission(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            window: Duration::from_secs(15 * 60),
            reason: "entry_submitted".to_string(),
        }
    }

    /// The 4-hour cooldown after a protective order fills.
    pub fn after_protective_fill(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            window: Duration::from_secs(4 * 60 * 60),
            reason: "protective_filled".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_window() {
        let req = CooldownRequest::after_submission("BTCUSDT");
        assert_eq!(req.window, Duration::from_secs(900));
        assert_eq!(req.reason, "entry_submitted");
    }

    #[test]
    fn test_protective_window() {
        let req = CooldownRequest::after_protective_fill("BTCUSDT");
        assert_eq!(req.window, Duration::from_secs(14_400));
    }
}
