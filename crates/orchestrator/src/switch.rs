//! Named boolean gates: global and per-symbol kill switches, plus the
//! timed disables backing cooldowns.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::info;

/// Gate guarding the whole trading pipeline.
pub const GLOBAL_TRADING: &str = "global_trading";

/// Gate guarding one symbol.
pub fn symbol_gate(symbol: &str) -> String {
    format!("symbol:{symbol}")
}

#[derive(Clone, Copy)]
struct GateState {
    enabled: bool,
    expires_at: Option<Instant>,
}

/// Named boolean gates with default-state semantics.
///
/// Unregistered gates default to enabled. `reset` restores the configured
/// default, not `false`. A timed disable reverts to the default once its
/// window elapses.
#[derive(Default)]
pub struct FeatureSwitch {
    defaults: DashMap<String, bool>,
    states: DashMap<String, GateState>,
}

impl FeatureSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a gate's default state.
    pub fn register(&self, name: impl Into<String>, default: bool) {
        self.defaults.insert(name.into(), default);
    }

    fn default_of(&self, name: &str) -> bool {
        self.defaults.get(name).map(|v| *v).unwrap_or(true)
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        let expired = match self.states.get(name) {
            None => return self.default_of(name),
            Some(state) => match state.expires_at {
                Some(expires) if Instant::now() >= expires => true,
                _ => return state.enabled,
            },
        };
        if expired {
            self.states.remove(name);
        }
        self.default_of(name)
    }

    pub fn enable(&self, name: &str) {
        self.set(name, true);
    }

    pub fn disable(&self, name: &str) {
        self.set(name, false);
    }

    /// Flip the current effective state; returns the new one.
    pub fn toggle(&self, name: &str) -> bool {
        let next = !self.is_enabled(name);
        self.set(name, next);
        next
    }

    /// Restore the configured default.
    pub fn reset(&self, name: &str) {
        self.states.remove(name);
    }

    /// Disable a gate for a fixed window; reverts to the default afterwards.
    pub fn disable_for(&self, name: &str, window: Duration) {
        info!(gate = name, window_secs = window.as_secs(), "gate disabled for window");
        self.states.insert(
            name.to_string(),
            GateState {
                enabled: false,
                expires_at: Some(Instant::now() + window),
            },
        );
    }

    fn set(&self, name: &str, enabled: bool) {
        self.states.insert(
            name.to_string(),
            GateState {
                enabled,
                expires_at: None,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unregistered_gate_defaults_to_enabled() {
        let switch = FeatureSwitch::new();
        assert!(switch.is_enabled("anything"));
    }

    #[test]
    fn test_disable_and_enable() {
        let switch = FeatureSwitch::new();
        switch.disable(GLOBAL_TRADING);
        assert!(!switch.is_enabled(GLOBAL_TRADING));
        switch.enable(GLOBAL_TRADING);
        assert!(switch.is_enabled(GLOBAL_TRADING));
    }

    #[test]
    fn test_reset_restores_configured_default() {
        let switch = FeatureSwitch::new();
        switch.register("experimental", false);
        switch.enable("experimental");
        assert!(switch.is_enabled("experimental"));

        // Back to the configured default, not to `false` blindly.
        switch.reset("experimental");
        assert!(!switch.is_enabled("experimental"));

        switch.register(GLOBAL_TRADING, true);
        switch.disable(GLOBAL_TRADING);
        switch.reset(GLOBAL_TRADING);
        assert!(switch.is_enabled(GLOBAL_TRADING));
    }

    #[test]
    fn test_toggle() {
        let switch = FeatureSwitch::new();
        assert!(!switch.toggle("gate"));
        assert!(switch.toggle("gate"));
        assert!(switch.is_enabled("gate"));
    }

    #[test]
    fn test_timed_disable_reverts() {
        let switch = FeatureSwitch::new();
        let gate = symbol_gate("BTCUSDT");

        switch.disable_for(&gate, Duration::from_millis(10));
        assert!(!switch.is_enabled(&gate));

        std::thread::sleep(Duration::from_millis(25));
        assert!(switch.is_enabled(&gate));
    }
}
