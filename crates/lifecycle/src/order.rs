//! Order records and lifecycle states.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use model::{SignalSide, TradeEntryRequest};

/// Lifecycle state of a tracked order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Seen via an external event before any local submission record.
    Unknown,
    /// Submitted locally, no exchange acknowledgement yet.
    Submitted,
    Pending,
    Acknowledged,
    Updated,
    PartiallyFilled,
    Filled,
    Cancelled,
    Finished,
}

impl OrderStatus {
    /// Terminal states accept no further meaningful transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Filled | Self::Cancelled | Self::Finished)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Submitted => "submitted",
            Self::Pending => "pending",
            Self::Acknowledged => "acknowledged",
            Self::Updated => "updated",
            Self::PartiallyFilled => "partially_filled",
            Self::Filled => "filled",
            Self::Cancelled => "cancelled",
            Self::Finished => "finished",
        }
    }
}

/// Role of an order within an entry's family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    Entry,
    StopLoss,
    TakeProfit,
}

impl OrderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::StopLoss => "stop_loss",
            Self::TakeProfit => "take_profit",
        }
    }
}

/// One tracked order. Records are never deleted; terminal orders stay
/// queryable for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub client_id: String,
    pub symbol: String,
    pub kind: OrderKind,
    pub status: OrderStatus,
    /// Position side; `None` for orders first seen via external events.
    pub side: Option<SignalSide>,
    pub size: Decimal,
    pub deal_size: Decimal,
    /// Protective prices captured at entry submission, used for repair.
    pub stop_loss_price: Option<Decimal>,
    pub take_profit_price: Option<Decimal>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRecord {
    /// Record for a locally submitted entry order. The protective prices
    /// are kept alongside so a later fill can repair missing stop/target
    /// orders without re-deriving them.
    pub fn from_entry(client_id: impl Into<String>, request: &TradeEntryRequest) -> Self {
        Self {
            client_id: client_id.into(),
            symbol: request.symbol.clone(),
            kind: OrderKind::Entry,
            status: OrderStatus::Submitted,
            side: Some(request.side),
            size: request.size,
            deal_size: Decimal::ZERO,
            stop_loss_price: Some(request.stop_loss_price),
            take_profit_price: Some(request.take_profit_price),
            updated_at: Utc::now(),
        }
    }

    /// Record lazily created for an order first seen via an exchange event.
    pub fn external(
        client_id: impl Into<String>,
        symbol: impl Into<String>,
        kind: OrderKind,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            symbol: symbol.into(),
            kind,
            status: OrderStatus::Unknown,
            side: None,
            size: Decimal::ZERO,
            deal_size: Decimal::ZERO,
            stop_loss_price: None,
            take_profit_price: None,
            updated_at: Utc::now(),
        }
    }

    /// Record for a protective order submitted during repair.
    pub fn submitted_protective(
        client_id: impl Into<String>,
        symbol: impl Into<String>,
        kind: OrderKind,
        side: SignalSide,
        size: Decimal,
        trigger_price: Decimal,
    ) -> Self {
        let (stop_loss_price, take_profit_price) = match kind {
            OrderKind::StopLoss => (Some(trigger_price), None),
            OrderKind::TakeProfit => (None, Some(trigger_price)),
            OrderKind::Entry => (None, None),
        };
        Self {
            client_id: client_id.into(),
            symbol: symbol.into(),
            kind,
            status: OrderStatus::Submitted,
            side: Some(side),
            size,
            deal_size: Decimal::ZERO,
            stop_loss_price,
            take_profit_price,
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Filled.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Finished.is_terminal());
        assert!(!OrderStatus::PartiallyFilled.is_terminal());
        assert!(!OrderStatus::Submitted.is_terminal());
        assert!(!OrderStatus::Unknown.is_terminal());
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(OrderStatus::PartiallyFilled.as_str(), "partially_filled");
        assert_eq!(OrderStatus::Acknowledged.as_str(), "acknowledged");
    }

    #[test]
    fn test_protective_record_keeps_trigger_by_kind() {
        let sl = OrderRecord::submitted_protective(
            "id",
            "BTCUSDT",
            OrderKind::StopLoss,
            SignalSide::Long,
            dec!(5),
            dec!(49000),
        );
        assert_eq!(sl.stop_loss_price, Some(dec!(49000)));
        assert!(sl.take_profit_price.is_none());

        let tp = OrderRecord::submitted_protective(
            "id",
            "BTCUSDT",
            OrderKind::TakeProfit,
            SignalSide::Long,
            dec!(5),
            dec!(51000),
        );
        assert_eq!(tp.take_profit_price, Some(dec!(51000)));
        assert!(tp.stop_loss_price.is_none());
    }
}
