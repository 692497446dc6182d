//! In-memory order persistence.

use dashmap::DashMap;

use crate::order::OrderRecord;

/// Order store keyed by client id.
///
/// Read-modify-write on one key is serialized by the map's per-shard
/// locking, so rapid successive exchange events for the same order cannot
/// lose updates. Records are never deleted.
#[derive(Default)]
pub struct OrderStore {
    orders: DashMap<String, OrderRecord>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, record: OrderRecord) {
        self.orders.insert(record.client_id.clone(), record);
    }

    pub fn get(&self, client_id: &str) -> Option<OrderRecord> {
        self.orders.get(client_id).map(|r| r.value().clone())
    }

    pub fn contains(&self, client_id: &str) -> bool {
        self.orders.contains_key(client_id)
    }

    /// Mutate one record under its shard lock, returning the updated copy.
    pub fn update<F>(&self, client_id: &str, f: F) -> Option<OrderRecord>
    where
        F: FnOnce(&mut OrderRecord),
    {
        let mut entry = self.orders.get_mut(client_id)?;
        f(entry.value_mut());
        Some(entry.value().clone())
    }

    pub fn for_symbol(&self, symbol: &str) -> Vec<OrderRecord> {
        self.orders
            .iter()
            .filter(|r| r.value().symbol == symbol)
            .map(|r| r.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
