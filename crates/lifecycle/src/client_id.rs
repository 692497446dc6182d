//! Client order id convention.
//!
//! Every order this system submits carries a structured client id:
//!
//! - entry orders: `MTF_<token>`
//! - protective orders: `MTF_<token>_SL_<suffix>` / `MTF_<token>_TP_<suffix>`
//!
//! `<token>` is a random hex token minted once per entry and shared by the
//! whole order family; `<suffix>` is minted per protective submission so
//! resubmissions during repair stay distinguishable. Classification and
//! parent extraction live here rather than as scattered substring checks.

use uuid::Uuid;

use crate::order::OrderKind;

const PREFIX: &str = "MTF_";
const SL_MARKER: &str = "_SL_";
const TP_MARKER: &str = "_TP_";

/// Mint a fresh entry token.
pub fn new_token() -> String {
    Uuid::new_v4().as_simple().to_string()
}

fn new_suffix() -> String {
    let id = Uuid::new_v4().as_simple().to_string();
    id[..8].to_string()
}

/// Entry client id for a token.
pub fn entry_id(token: &str) -> String {
    format!("{PREFIX}{token}")
}

/// Fresh stop-loss client id tied to an entry token.
pub fn stop_loss_id(token: &str) -> String {
    format!("{PREFIX}{token}{SL_MARKER}{}", new_suffix())
}

/// Fresh take-profit client id tied to an entry token.
pub fn take_profit_id(token: &str) -> String {
    format!("{PREFIX}{token}{TP_MARKER}{}", new_suffix())
}

/// Whether this id was minted by this system.
pub fn is_ours(client_id: &str) -> bool {
    client_id.starts_with(PREFIX)
}

/// Classify an id by its kind marker; anything without one is an entry.
pub fn kind_of(client_id: &str) -> OrderKind {
    if client_id.contains(SL_MARKER) {
        OrderKind::StopLoss
    } else if client_id.contains(TP_MARKER) {
        OrderKind::TakeProfit
    } else {
        OrderKind::Entry
    }
}

/// Extract the entry token from any id in a family. `None` for ids not
/// minted by this system.
pub fn token_of(client_id: &str) -> Option<&str> {
    let rest = client_id.strip_prefix(PREFIX)?;
    let end = rest
        .find(SL_MARKER)
        .or_else(|| rest.find(TP_MARKER))
        .unwrap_or(rest.len());
    let token = &rest[..end];
    (!token.is_empty()).then_some(token)
}

/// Whether `client_id` belongs to the family of the given entry token.
pub fn belongs_to(client_id: &str, token: &str) -> bool {
    token_of(client_id) == Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_id_roundtrip() {
        let token = new_token();
        let id = entry_id(&token);
        assert!(is_ours(&id));
        assert_eq!(kind_of(&id), OrderKind::Entry);
        assert_eq!(token_of(&id), Some(token.as_str()));
    }

    #[test]
    fn test_protective_ids_carry_parent_token() {
        let token = "abc123";
        let sl = stop_loss_id(token);
        let tp = take_profit_id(token);

        assert_eq!(kind_of(&sl), OrderKind::StopLoss);
        assert_eq!(kind_of(&tp), OrderKind::TakeProfit);
        assert!(belongs_to(&sl, token));
        assert!(belongs_to(&tp, token));
        assert!(!belongs_to(&sl, "other"));
    }

    #[test]
    fn test_suffixes_differ_across_submissions() {
        let token = "abc123";
        assert_ne!(stop_loss_id(token), stop_loss_id(token));
    }

    #[test]
    fn test_foreign_ids_have_no_token() {
        assert!(!is_ours("x-broker-42"));
        assert_eq!(token_of("x-broker-42"), None);
        assert_eq!(kind_of("x-broker-42"), OrderKind::Entry);
    }
}
