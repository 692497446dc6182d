//! Downstream order-signal dispatch.
//!
//! Signals leave this system as HMAC-signed JSON posts
//! (`X-Timestamp`/`X-Signature`, signature over `timestamp + "\n" + body`)
//! delivered on a fixed backoff schedule (0s, 5s, 15s, 45s, 120s by
//! default) with a hard attempt ceiling. 4xx responses are permanent;
//! exhausted or rejected signals land in a dead-letter sink instead of
//! being dropped.

mod dead_letter;
mod dispatcher;
mod signer;

pub use dead_letter::{DeadLetter, DeadLetterSink, InMemoryDeadLetterSink};
pub use dispatcher::{
    DispatchError, DispatchStats, HttpTransport, SignalDispatcher, SignalTransport,
    TransportFailure,
};
pub use signer::{SignalSigner, SignedHeaders, SIGNATURE_HEADER, TIMESTAMP_HEADER};
