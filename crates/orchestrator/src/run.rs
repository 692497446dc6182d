//! One MTF cycle over all requested symbols.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{error, info};

use decision::{DecisionAction, TradingDecisionService};
use model::{RunStatus, RunSummary, SymbolError, SymbolResult, SymbolStatus};
use validation::{IndicatorProvider, MtfValidator, ValidationError};

use crate::audit::AuditLogger;
use crate::lock::{LockManager, LockStore};
use crate::switch::{symbol_gate, FeatureSwitch, GLOBAL_TRADING};

/// Symbols and locking knobs for one orchestrator.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub symbols: Vec<String>,
    /// One lock per symbol instead of a single run-level lock.
    pub lock_per_symbol: bool,
    pub lock_ttl: Duration,
    pub lock_max_attempts: u32,
    pub lock_retry_delay: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            lock_per_symbol: false,
            lock_ttl: Duration::from_secs(300),
            lock_max_attempts: 3,
            lock_retry_delay: Duration::from_millis(500),
        }
    }
}

/// Per-invocation flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Bypass the global switch.
    pub force_run: bool,
    /// Validate only; no decisions, no cooldowns.
    pub dry_run: bool,
}

/// Drives one full cycle: switch checks, locking, per-symbol validation and
/// decision, summary aggregation, audit.
pub struct RunOrchestrator<P, S, A> {
    validator: MtfValidator,
    decision: TradingDecisionService,
    provider: Arc<P>,
    locks: LockManager<S>,
    switches: Arc<FeatureSwitch>,
    audit: Arc<A>,
    config: RunConfig,
}

impl<P, S, A> RunOrchestrator<P, S, A>
where
    P: IndicatorProvider,
    S: LockStore,
    A: AuditLogger,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        validator: MtfValidator,
        decision: TradingDecisionService,
        provider: Arc<P>,
        locks: LockManager<S>,
        switches: Arc<FeatureSwitch>,
        audit: Arc<A>,
        config: RunConfig,
    ) -> Self {
        Self {
            validator,
            decision,
            provider,
            locks,
            switches,
            audit,
            config,
        }
    }

    /// Run one cycle. Early terminations (`global_switch_off`,
    /// `no_active_symbols`, `lock_acquisition_failed`) are statuses on an
    /// otherwise-empty summary, never errors.
    pub async fn run(&self, options: RunOptions) -> RunSummary {
        let started = Utc::now();
        let requested = self.config.symbols.len();

        if !options.force_run && !self.switches.is_enabled(GLOBAL_TRADING) {
            info!("global switch off, run aborted");
            return self.finish(RunSummary::empty(
                RunStatus::GlobalSwitchOff,
                requested,
                elapsed_ms(started),
            ));
        }

        if requested == 0 {
            info!("no symbols requested");
            return self.finish(RunSummary::empty(
                RunStatus::NoActiveSymbols,
                requested,
                elapsed_ms(started),
            ));
        }

        let keys: Vec<String> = if self.config.lock_per_symbol {
            self.config
                .symbols
                .iter()
                .map(|s| format!("mtf_run:{s}"))
                .collect()
        } else {
            vec!["mtf_run:global".to_string()]
        };

        let mut held: Vec<(String, String)> = Vec::with_capacity(keys.len());
        for key in &keys {
            let acquired = self
                .locks
                .acquire_with_retry(
                    key,
                    self.config.lock_ttl,
                    self.config.lock_max_attempts,
                    self.config.lock_retry_delay,
                )
                .await;
            match acquired {
                Some(token) => held.push((key.clone(), token)),
                None => {
                    for (key, token) in &held {
                        self.locks.release(key, token);
                    }
                    return self.finish(RunSummary::empty(
                        RunStatus::LockAcquisitionFailed,
                        requested,
                        elapsed_ms(started),
                    ));
                }
            }
        }

        let mut results = Vec::with_capacity(requested);
        for symbol in &self.config.symbols {
            if !self.switches.is_enabled(&symbol_gate(symbol)) {
                info!(symbol = %symbol, "symbol switch off, skipping");
                results.push(SymbolResult::skipped(symbol));
                continue;
            }
            results.push(self.process_symbol(symbol, options));
        }

        for (key, token) in &held {
            self.locks.release(key, token);
        }

        let successful = count(&results, SymbolStatus::Success);
        let failed = count(&results, SymbolStatus::Error);
        let skipped = count(&results, SymbolStatus::Skipped);
        let processed = successful + failed;
        let success_rate = if processed > 0 {
            successful as f64 / processed as f64
        } else {
            0.0
        };

        self.finish(RunSummary {
            status: RunStatus::Completed,
            requested,
            processed,
            successful,
            failed,
            skipped,
            success_rate,
            duration_ms: elapsed_ms(started),
            results,
        })
    }

    /// One symbol's validation and (unless dry-run) decision. A failure here
    /// becomes this symbol's `Error` result, never a run abort.
    fn process_symbol(&self, symbol: &str, options: RunOptions) -> SymbolResult {
        let outcome = match self.validator.validate(symbol, self.provider.as_ref()) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(symbol, error = %err, "symbol evaluation failed");
                let code = match &err {
                    ValidationError::Rule(_) => "config_error",
                    ValidationError::Provider(_) => "provider_error",
                };
                return SymbolResult::error(symbol, SymbolError::new(code, err.to_string()));
            }
        };

        if options.dry_run {
            return outcome.result;
        }

        let evaluation = self.decision.evaluate(outcome.result);
        if evaluation.action == DecisionAction::Prepare {
            self.audit.log_action(
                "trade_prepared",
                "decision",
                symbol,
                &json!({
                    "decision_key": evaluation.decision_key,
                    "request": evaluation.trade_request,
                }),
            );
            if let Some(cooldown) = &evaluation.cooldown {
                self.switches
                    .disable_for(&symbol_gate(&cooldown.symbol), cooldown.window);
            }
        }
        evaluation.result
    }

    fn finish(&self, summary: RunSummary) -> RunSummary {
        self.audit.log_action(
            "run_finished",
            "orchestrator",
            summary.status.as_str(),
            &json!({
                "requested": summary.requested,
                "processed": summary.processed,
                "successful": summary.successful,
                "failed": summary.failed,
                "skipped": summary.skipped,
                "success_rate": summary.success_rate,
                "duration_ms": summary.duration_ms,
            }),
        );
        summary
    }
}

fn count(results: &[SymbolResult], status: SymbolStatus) -> usize {
    results.iter().filter(|r| r.status == status).count()
}

fn elapsed_ms(started: DateTime<Utc>) -> i64 {
    (Utc::now() - started).num_milliseconds()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use parking_lot::Mutex;
    use rust_decimal_macros::dec;
    use serde_json::Value;

    use decision::DecisionConfig;
    use model::{IndicatorContext, Timeframe};
    use rule_engine::ConditionRegistry;
    use validation::{ProviderError, ValidationConfig};

    use crate::lock::InMemoryLockStore;

    struct FixtureProvider {
        contexts: HashMap<(String, Timeframe), IndicatorContext>,
    }

    impl IndicatorProvider for FixtureProvider {
        fn indicator_context(
            &self,
            symbol: &str,
            timeframe: Timeframe,
        ) -> Result<IndicatorContext, ProviderError> {
            self.contexts
                .get(&(symbol.to_string(), timeframe))
                .cloned()
                .ok_or_else(|| ProviderError::NoData {
                    symbol: symbol.to_string(),
                    timeframe,
                })
        }
    }

    #[derive(Default)]
    struct RecordingAudit {
        actions: Mutex<Vec<(String, String)>>,
    }

    impl AuditLogger for RecordingAudit {
        fn log_action(&self, action: &str, _category: &str, subject_id: &str, _details: &Value) {
            self.actions
                .lock()
                .push((action.to_string(), subject_id.to_string()));
        }
    }

    fn validator() -> MtfValidator {
        let registry = ConditionRegistry::from_json(&serde_json::json!({
            "trend_up": {
                "all_of": [
                    { "kind": "field_gt", "fields": ["ema_fast", "ema_slow"] },
                    { "kind": "op_cmp", "op": ">", "left": "macd.hist", "right": 0 }
                ]
            }
        }))
        .unwrap();
        let config: ValidationConfig = serde_json::from_value(serde_json::json!({
            "timeframes": { "15m": { "long": [ { "rule": "trend_up" } ] } }
        }))
        .unwrap();
        MtfValidator::new(registry, config)
    }

    fn bullish_ctx() -> IndicatorContext {
        IndicatorContext::new()
            .with_value("ema_fast", dec!(102))
            .with_value("ema_slow", dec!(100))
            .with_value("macd.hist", dec!(0.8))
            .with_value("close", dec!(50000))
            .with_value("atr", dec!(120))
    }

    struct Fixture {
        orchestrator:
            RunOrchestrator<FixtureProvider, InMemoryLockStore, RecordingAudit>,
        store: Arc<InMemoryLockStore>,
        switches: Arc<FeatureSwitch>,
        audit: Arc<RecordingAudit>,
    }

    fn fixture(symbols: &[&str]) -> Fixture {
        let mut contexts = HashMap::new();
        for symbol in symbols {
            contexts.insert((symbol.to_string(), Timeframe::M15), bullish_ctx());
        }
        let store = Arc::new(InMemoryLockStore::new());
        let switches = Arc::new(FeatureSwitch::new());
        let audit = Arc::new(RecordingAudit::default());
        let config = RunConfig {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            lock_max_attempts: 1,
            lock_retry_delay: Duration::from_millis(1),
            ..RunConfig::default()
        };
        let orchestrator = RunOrchestrator::new(
            validator(),
            TradingDecisionService::new(DecisionConfig::default()),
            Arc::new(FixtureProvider { contexts }),
            LockManager::new(store.clone()),
            switches.clone(),
            audit.clone(),
            config,
        );
        Fixture {
            orchestrator,
            store,
            switches,
            audit,
        }
    }

    #[tokio::test]
    async fn test_completed_run_prepares_trade() {
        let f = fixture(&["BTCUSDT"]);
        let summary = f.orchestrator.run(RunOptions::default()).await;

        assert_eq!(summary.status, RunStatus::Completed);
        assert_eq!(summary.requested, 1);
        assert_eq!(summary.successful, 1);
        assert_eq!(summary.success_rate, 1.0);

        let actions = f.audit.actions.lock();
        assert!(actions.iter().any(|(a, s)| a == "trade_prepared" && s == "BTCUSDT"));
        // Post-preparation cooldown disables the symbol gate.
        assert!(!f.switches.is_enabled(&symbol_gate("BTCUSDT")));
    }

    #[tokio::test]
    async fn test_dry_run_skips_decision_and_cooldown() {
        let f = fixture(&["BTCUSDT"]);
        let summary = f
            .orchestrator
            .run(RunOptions {
                dry_run: true,
                ..RunOptions::default()
            })
            .await;

        assert_eq!(summary.status, RunStatus::Completed);
        assert_eq!(summary.successful, 1);
        assert!(f.switches.is_enabled(&symbol_gate("BTCUSDT")));
        assert!(!f
            .audit
            .actions
            .lock()
            .iter()
            .any(|(a, _)| a == "trade_prepared"));
    }

    #[tokio::test]
    async fn test_global_switch_off_aborts() {
        let f = fixture(&["BTCUSDT"]);
        f.switches.disable(GLOBAL_TRADING);

        let summary = f.orchestrator.run(RunOptions::default()).await;
        assert_eq!(summary.status, RunStatus::GlobalSwitchOff);
        assert_eq!(summary.processed, 0);
        assert!(summary.results.is_empty());
    }

    #[tokio::test]
    async fn test_force_run_bypasses_global_switch() {
        let f = fixture(&["BTCUSDT"]);
        f.switches.disable(GLOBAL_TRADING);

        let summary = f
            .orchestrator
            .run(RunOptions {
                force_run: true,
                ..RunOptions::default()
            })
            .await;
        assert_eq!(summary.status, RunStatus::Completed);
    }

    #[tokio::test]
    async fn test_no_symbols_terminates_early() {
        let f = fixture(&[]);
        let summary = f.orchestrator.run(RunOptions::default()).await;
        assert_eq!(summary.status, RunStatus::NoActiveSymbols);
    }

    #[tokio::test]
    async fn test_blocked_lock_terminates_early() {
        let f = fixture(&["BTCUSDT"]);
        let foreign = LockManager::new(f.store.clone());
        let _held = foreign
            .acquire("mtf_run:global", Duration::from_secs(60))
            .unwrap();

        let summary = f.orchestrator.run(RunOptions::default()).await;
        assert_eq!(summary.status, RunStatus::LockAcquisitionFailed);
        assert_eq!(summary.processed, 0);
    }

    #[tokio::test]
    async fn test_symbol_switch_off_records_skipped() {
        let f = fixture(&["BTCUSDT", "ETHUSDT"]);
        f.switches.disable(&symbol_gate("ETHUSDT"));

        let summary = f.orchestrator.run(RunOptions::default()).await;
        assert_eq!(summary.status, RunStatus::Completed);
        assert_eq!(summary.successful, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.results[1].status, SymbolStatus::Skipped);
    }

    #[tokio::test]
    async fn test_one_failing_symbol_does_not_abort_run() {
        // NODATA has no fixture context: its provider lookup fails.
        let f = fixture_with_missing(&["BTCUSDT", "NODATA"], "NODATA");

        let summary = f.orchestrator.run(RunOptions::default()).await;
        assert_eq!(summary.status, RunStatus::Completed);
        assert_eq!(summary.successful, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.success_rate, 0.5);

        let failed = &summary.results[1];
        assert_eq!(failed.status, SymbolStatus::Error);
        assert_eq!(failed.error.as_ref().unwrap().code, "provider_error");
    }

    fn fixture_with_missing(symbols: &[&str], missing: &str) -> Fixture {
        let f = fixture(symbols);
        // Rebuild the provider without the missing symbol's context.
        let mut contexts = HashMap::new();
        for symbol in symbols {
            if *symbol != missing {
                contexts.insert((symbol.to_string(), Timeframe::M15), bullish_ctx());
            }
        }
        let config = RunConfig {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            lock_max_attempts: 1,
            lock_retry_delay: Duration::from_millis(1),
            ..RunConfig::default()
        };
        Fixture {
            orchestrator: RunOrchestrator::new(
                validator(),
                TradingDecisionService::new(DecisionConfig::default()),
                Arc::new(FixtureProvider { contexts }),
                LockManager::new(f.store.clone()),
                f.switches.clone(),
                f.audit.clone(),
                config,
            ),
            store: f.store,
            switches: f.switches,
            audit: f.audit,
        }
    }

    #[tokio::test]
    async fn test_per_symbol_locks_are_all_released() {
        let mut f = fixture(&["BTCUSDT", "ETHUSDT"]);
        f.orchestrator.config.lock_per_symbol = true;

        let summary = f.orchestrator.run(RunOptions::default()).await;
        assert_eq!(summary.status, RunStatus::Completed);

        // Both per-symbol locks were released: both can be reacquired.
        let locks = LockManager::new(f.store.clone());
        assert!(locks.acquire("mtf_run:BTCUSDT", Duration::from_secs(1)).is_some());
        assert!(locks.acquire("mtf_run:ETHUSDT", Duration::from_secs(1)).is_some());
    }
}
