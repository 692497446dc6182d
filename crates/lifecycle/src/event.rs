//! Exchange order events and the status transition table.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::order::OrderStatus;

/// Cancellation reason codes reported in the event `action` field.
pub const ACTION_CANCEL: i64 = 3;
pub const ACTION_LIQUIDATE_CANCEL: i64 = 4;
pub const ACTION_ADL_CANCEL: i64 = 5;

const STATE_PENDING: i64 = 1;
const STATE_ACKNOWLEDGED: i64 = 2;
const STATE_FINISHED: i64 = 4;

/// One order update from the exchange stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    pub client_id: String,
    #[serde(default)]
    pub symbol: Option<String>,
    /// Numeric reason code; cancellation codes dominate the transition.
    #[serde(default)]
    pub action: Option<i64>,
    /// Numeric exchange state, consulted when fill arithmetic is silent.
    #[serde(default)]
    pub state: Option<i64>,
    #[serde(default)]
    pub size: Decimal,
    #[serde(default)]
    pub deal_size: Decimal,
}

impl OrderEvent {
    /// The status this event implies, independent of the current one.
    ///
    /// Resolution order: cancellation actions, then fill arithmetic, then
    /// the exchange's numeric state table.
    pub fn next_status(&self) -> OrderStatus {
        if matches!(
            self.action,
            Some(ACTION_CANCEL | ACTION_LIQUIDATE_CANCEL | ACTION_ADL_CANCEL)
        ) {
            return OrderStatus::Cancelled;
        }
        if self.size > Decimal::ZERO && self.deal_size >= self.size {
            return OrderStatus::Filled;
        }
        if self.deal_size > Decimal::ZERO && self.deal_size < self.size {
            return OrderStatus::PartiallyFilled;
        }
        match self.state {
            Some(STATE_PENDING) => OrderStatus::Pending,
            Some(STATE_ACKNOWLEDGED) => OrderStatus::Acknowledged,
            Some(STATE_FINISHED) => OrderStatus::Finished,
            _ => OrderStatus::Updated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn event(action: Option<i64>, state: Option<i64>, size: Decimal, deal: Decimal) -> OrderEvent {
        OrderEvent {
            client_id: "MTF_t".to_string(),
            symbol: Some("BTCUSDT".to_string()),
            action,
            state,
            size,
            deal_size: deal,
        }
    }

    #[test]
    fn test_cancel_action_dominates_fill() {
        // Fully dealt, but a cancel code still wins.
        let e = event(Some(ACTION_CANCEL), Some(2), dec!(10), dec!(10));
        assert_eq!(e.next_status(), OrderStatus::Cancelled);
    }

    #[test]
    fn test_liquidate_and_adl_cancel() {
        let e = event(Some(ACTION_LIQUIDATE_CANCEL), None, dec!(0), dec!(0));
        assert_eq!(e.next_status(), OrderStatus::Cancelled);
        let e = event(Some(ACTION_ADL_CANCEL), None, dec!(0), dec!(0));
        assert_eq!(e.next_status(), OrderStatus::Cancelled);
    }

    #[test]
    fn test_full_fill() {
        let e = event(None, Some(2), dec!(10), dec!(10));
        assert_eq!(e.next_status(), OrderStatus::Filled);
    }

    #[test]
    fn test_over_fill_is_still_filled() {
        let e = event(None, None, dec!(10), dec!(11));
        assert_eq!(e.next_status(), OrderStatus::Filled);
    }

    #[test]
    fn test_partial_fill() {
        let e = event(None, Some(2), dec!(10), dec!(4));
        assert_eq!(e.next_status(), OrderStatus::PartiallyFilled);
    }

    #[test]
    fn test_zero_size_never_fills() {
        let e = event(None, Some(1), dec!(0), dec!(0));
        assert_eq!(e.next_status(), OrderStatus::Pending);
    }

    #[test]
    fn test_state_table() {
        assert_eq!(
            event(None, Some(1), dec!(10), dec!(0)).next_status(),
            OrderStatus::Pending
        );
        assert_eq!(
            event(None, Some(2), dec!(10), dec!(0)).next_status(),
            OrderStatus::Acknowledged
        );
        assert_eq!(
            event(None, Some(4), dec!(10), dec!(0)).next_status(),
            OrderStatus::Finished
        );
        assert_eq!(
            event(None, Some(99), dec!(10), dec!(0)).next_status(),
            OrderStatus::Updated
        );
        assert_eq!(
            event(None, None, dec!(10), dec!(0)).next_status(),
            OrderStatus::Updated
        );
    }
}
