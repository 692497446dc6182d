//! Event application and protective-order repair.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};

use model::{CooldownRequest, TradeEntryRequest};

use crate::client_id;
use crate::error::LifecycleError;
use crate::event::OrderEvent;
use crate::order::{OrderKind, OrderRecord, OrderStatus};
use crate::provider::{ProtectiveOrderRequest, TradingProvider};
use crate::store::OrderStore;

/// What applying one exchange event produced.
#[derive(Debug, Default)]
pub struct EventOutcome {
    /// Status after the event, when a record was matched or created.
    pub status: Option<OrderStatus>,
    /// Client ids of protective orders resubmitted during repair.
    pub repaired: Vec<String>,
    /// Cooldown to apply after a protective order fill.
    pub cooldown: Option<CooldownRequest>,
}

/// Applies exchange events to the order store and keeps filled entries
/// protected.
pub struct OrderLifecycleService<P> {
    store: Arc<OrderStore>,
    provider: Arc<P>,
}

impl<P: TradingProvider> OrderLifecycleService<P> {
    pub fn new(store: Arc<OrderStore>, provider: Arc<P>) -> Self {
        Self { store, provider }
    }

    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    /// Register a freshly submitted entry order so later exchange events
    /// and protective repair can correlate against it. Returns the minted
    /// client id.
    pub fn register_entry(&self, request: &TradeEntryRequest) -> String {
        let token = client_id::new_token();
        let id = client_id::entry_id(&token);
        self.store.upsert(OrderRecord::from_entry(&id, request));
        info!(symbol = %request.symbol, client_id = %id, "entry order registered");
        id
    }

    /// Apply one exchange event.
    ///
    /// Orders without a local record are lazily created when the event
    /// carries a symbol; events without one are logged and discarded.
    pub async fn apply_event(&self, event: OrderEvent) -> Result<EventOutcome, LifecycleError> {
        if !self.store.contains(&event.client_id) {
            let Some(symbol) = event.symbol.as_deref() else {
                warn!(
                    client_id = %event.client_id,
                    "event for unknown order carries no symbol, discarding"
                );
                return Ok(EventOutcome::default());
            };
            let kind = client_id::kind_of(&event.client_id);
            self.store
                .upsert(OrderRecord::external(&event.client_id, symbol, kind));
            info!(
                client_id = %event.client_id,
                symbol,
                kind = kind.as_str(),
                "unknown order lazily created"
            );
        }

        // Terminal records accept no further transitions: a stale or
        // redelivered event must not revive a cancelled/filled order (and
        // must never trigger repair for a position that never opened).
        if let Some(existing) = self.store.get(&event.client_id) {
            if existing.status.is_terminal() {
                warn!(
                    client_id = %event.client_id,
                    status = existing.status.as_str(),
                    "event for terminal order ignored"
                );
                return Ok(EventOutcome::default());
            }
        }

        let next = event.next_status();
        let Some(record) = self.store.update(&event.client_id, |record| {
            record.status = next;
            if event.size > Decimal::ZERO {
                record.size = event.size;
            }
            if event.deal_size > Decimal::ZERO {
                record.deal_size = event.deal_size;
            }
            record.updated_at = Utc::now();
        }) else {
            warn!(client_id = %event.client_id, "order record missing after upsert");
            return Ok(EventOutcome::default());
        };

        let mut outcome = EventOutcome {
            status: Some(next),
            ..EventOutcome::default()
        };

        match record.kind {
            OrderKind::Entry
                if matches!(next, OrderStatus::Filled | OrderStatus::PartiallyFilled) =>
            {
                outcome.repaired = self.repair_protective(&record).await?;
            }
            OrderKind::StopLoss | OrderKind::TakeProfit if next == OrderStatus::Filled => {
                info!(
                    symbol = %record.symbol,
                    client_id = %record.client_id,
                    kind = record.kind.as_str(),
                    "protective order filled, starting re-entry cooldown"
                );
                outcome.cooldown = Some(CooldownRequest::after_protective_fill(&record.symbol));
            }
            _ => {}
        }
        Ok(outcome)
    }

    /// Ensure both protective orders exist for a (partially) filled entry.
    ///
    /// Idempotent: open orders are checked first, so calling again after a
    /// successful repair submits nothing.
    async fn repair_protective(&self, entry: &OrderRecord) -> Result<Vec<String>, LifecycleError> {
        // Entries submitted outside this system carry no token and no
        // stored context to repair from.
        let Some(token) = client_id::token_of(&entry.client_id) else {
            return Ok(Vec::new());
        };
        let Some(side) = entry.side else {
            return Ok(Vec::new());
        };

        let open = self.provider.get_open_orders(&entry.symbol).await?;
        let exists = |kind: OrderKind| {
            open.iter().any(|order| {
                client_id::kind_of(&order.client_id) == kind
                    && client_id::belongs_to(&order.client_id, token)
            })
        };

        let mut repaired = Vec::new();
        for kind in [OrderKind::StopLoss, OrderKind::TakeProfit] {
            if exists(kind) {
                continue;
            }
            let trigger = match kind {
                OrderKind::StopLoss => entry.stop_loss_price,
                OrderKind::TakeProfit => entry.take_profit_price,
                OrderKind::Entry => None,
            };
            let Some(trigger_price) = trigger else {
                warn!(
                    symbol = %entry.symbol,
                    client_id = %entry.client_id,
                    kind = kind.as_str(),
                    "entry has no stored trigger price, cannot repair"
                );
                continue;
            };

            let id = match kind {
                OrderKind::StopLoss => client_id::stop_loss_id(token),
                _ => client_id::take_profit_id(token),
            };
            let request = ProtectiveOrderRequest {
                client_id: id.clone(),
                symbol: entry.symbol.clone(),
                kind,
                position_side: side,
                trigger_price,
                size: entry.size,
            };
            let order_id = self.provider.submit_tpsl_order(&request).await?;
            self.store.upsert(OrderRecord::submitted_protective(
                &id,
                &entry.symbol,
                kind,
                side,
                entry.size,
                trigger_price,
            ));
            info!(
                symbol = %entry.symbol,
                client_id = %id,
                order_id = %order_id,
                kind = kind.as_str(),
                "protective order resubmitted"
            );
            repaired.push(id);
        }
        Ok(repaired)
    }
}
