//! Order lifecycle tracking.
//!
//! Exchange order events drive a small state machine per order:
//!
//! ```text
//! UNKNOWN → SUBMITTED → {PENDING, ACKNOWLEDGED, UPDATED}
//!         → {PARTIALLY_FILLED → FILLED | CANCELLED | FINISHED}
//! ```
//!
//! On entry fills the service repairs missing stop-loss/take-profit plan
//! orders from the entry's stored context; on protective fills it emits a
//! re-entry cooldown. Orders are correlated through a structured client-id
//! convention (`MTF_<token>` families, see [`client_id`]).

pub mod client_id;
mod error;
mod event;
mod order;
mod provider;
mod service;
mod store;

pub use error::LifecycleError;
pub use event::{OrderEvent, ACTION_ADL_CANCEL, ACTION_CANCEL, ACTION_LIQUIDATE_CANCEL};
pub use order::{OrderKind, OrderRecord, OrderStatus};
pub use provider::{OpenOrder, ProtectiveOrderRequest, TradingProvider};
pub use service::{EventOutcome, OrderLifecycleService};
pub use store::OrderStore;
