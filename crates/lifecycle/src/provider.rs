//! Exchange-facing port for open-order queries and protective submissions.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use model::SignalSide;

use crate::error::LifecycleError;
use crate::order::OrderKind;

/// One open plan (conditional) order as reported by the exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenOrder {
    pub client_id: String,
    pub symbol: String,
}

/// A stop-loss/take-profit plan order submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectiveOrderRequest {
    pub client_id: String,
    pub symbol: String,
    pub kind: OrderKind,
    /// Side of the position being protected; the close side is implied.
    pub position_side: SignalSide,
    pub trigger_price: Decimal,
    pub size: Decimal,
}

/// Injected exchange port. The lifecycle service never talks to the
/// exchange directly.
#[async_trait]
pub trait TradingProvider: Send + Sync {
    /// Open plan orders for a symbol.
    async fn get_open_orders(&self, symbol: &str) -> Result<Vec<OpenOrder>, LifecycleError>;

    /// Submit a protective plan order, returning the exchange order id.
    async fn submit_tpsl_order(
        &self,
        request: &ProtectiveOrderRequest,
    ) -> Result<String, LifecycleError>;
}
