//! Indicator snapshot for one symbol+timeframe.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Immutable mapping from indicator key to value, scoped to one
/// symbol+timeframe snapshot.
///
/// Scalar keys are dotted paths like `close`, `ema_fast` or `macd.hist`.
/// Raw series live under `{field}_series` keys and are ordered newest-first
/// (index 0 is the current bar).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorContext {
    values: HashMap<String, Decimal>,
    series: HashMap<String, Vec<Decimal>>,
}

impl IndicatorContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a scalar indicator value.
    pub fn value(&self, key: &str) -> Option<Decimal> {
        self.values.get(key).copied()
    }

    /// Look up a raw series (newest-first).
    ///
    /// `field` may be the bare field name; the conventional `{field}_series`
    /// key is tried first, then the field name itself.
    pub fn series(&self, field: &str) -> Option<&[Decimal]> {
        let key = format!("{field}_series");
        self.series
            .get(&key)
            .or_else(|| self.series.get(field))
            .map(|v| v.as_slice())
    }

    /// Builder-style scalar insertion.
    pub fn with_value(mut self, key: impl Into<String>, value: Decimal) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Builder-style series insertion (values newest-first).
    pub fn with_series(mut self, key: impl Into<String>, values: Vec<Decimal>) -> Self {
        self.series.insert(key.into(), values);
        self
    }

    /// Number of scalar entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the context has no scalar entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
