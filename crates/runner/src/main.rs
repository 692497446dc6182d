//! Demo runner: one MTF cycle over bundled indicator fixtures.
//!
//! Symbols come from the command line (default `BTCUSDT`). The run summary
//! is printed as JSON; prepared trade signals are optionally dispatched to
//! `SIGNAL_WEBHOOK_URL` signed with `SIGNAL_WEBHOOK_SECRET`.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal_macros::dec;
use tracing::{error, info};

use common::RetrySchedule;
use decision::{DecisionConfig, TradingDecisionService};
use dispatch::{HttpTransport, InMemoryDeadLetterSink, SignalDispatcher, SignalSigner};
use model::{IndicatorContext, Timeframe};
use orchestrator::{
    FeatureSwitch, InMemoryLockStore, LockManager, RunConfig, RunOptions, RunOrchestrator,
    TracingAuditLogger,
};
use rule_engine::ConditionRegistry;
use validation::{IndicatorProvider, MtfValidator, ProviderError, ValidationConfig};

const DISPATCH_MAX_ATTEMPTS: u32 = 5;

/// Fixture provider serving one pre-built snapshot per symbol+timeframe.
struct StaticProvider {
    contexts: HashMap<(String, Timeframe), IndicatorContext>,
}

impl IndicatorProvider for StaticProvider {
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

fn bullish_snapshot() -> IndicatorContext {
    IndicatorContext::new()
        .with_value("ema_fast", dec!(102.4))
        .with_value("ema_slow", dec!(100.1))
        .with_value("macd.hist", dec!(0.82))
        .with_value("close", dec!(50000))
        .with_value("atr", dec!(120))
        .with_series(
            "adx",
            vec![dec!(28.4), dec!(27.1), dec!(25.3), dec!(24.0)],
        )
}

fn rules() -> serde_json::Value {
    serde_json::json!({
        "trend_up": {
            "all_of": [
                { "kind": "field_gt", "fields": ["ema_fast", "ema_slow"] },
                { "kind": "op_cmp", "op": ">", "left": "macd.hist", "right": 0 },
                { "kind": "trend_increasing", "field": "adx", "n": 3, "strict": true }
            ]
        },
        "trend_down": {
            "all_of": [
                { "kind": "field_lt", "fields": ["ema_fast", "ema_slow"] },
                { "kind": "op_cmp", "op": "<", "left": "macd.hist", "right": 0 }
            ]
        }
    })
}

fn validation_config() -> serde_json::Value {
    serde_json::json!({
        "start_from": "4h",
        "timeframes": {
            "4h":  { "long": [ { "rule": "trend_up" } ], "short": [ { "rule": "trend_down" } ] },
            "1h":  { "long": [ { "rule": "trend_up" } ], "short": [ { "rule": "trend_down" } ] },
            "15m": { "long": [ { "rule": "trend_up" } ], "short": [ { "rule": "trend_down" } ] }
        }
    })
}

#[tokio::main]
async fn main() {
    common::init_logging();

    let symbols = std::env::args().skip(1).collect::<Vec<_>>();
    let symbols = if symbols.is_empty() {
        vec!["BTCUSDT".to_string()]
    } else {
        symbols
    };
    info!(symbols = ?symbols, "starting MTF cycle");

    let registry = match ConditionRegistry::from_json(&rules()) {
        Ok(registry) => registry,
        Err(e) => {
            error!(error = %e, "rules configuration rejected");
            return;
        }
    };
    let config: ValidationConfig = match serde_json::from_value(validation_config()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "validation configuration rejected");
            return;
        }
    };

    let mut contexts = HashMap::new();
    for symbol in &symbols {
        for timeframe in [Timeframe::H4, Timeframe::H1, Timeframe::M15] {
            contexts.insert((symbol.clone(), timeframe), bullish_snapshot());
        }
    }

    let orchestrator = RunOrchestrator::new(
        MtfValidator::new(registry, config),
        TradingDecisionService::new(DecisionConfig::default()),
        Arc::new(StaticProvider { contexts }),
        LockManager::new(Arc::new(InMemoryLockStore::new())),
        Arc::new(FeatureSwitch::new()),
        Arc::new(TracingAuditLogger),
        RunConfig {
            symbols,
            ..RunConfig::default()
        },
    );

    let summary = orchestrator.run(RunOptions::default()).await;

    match serde_json::to_string_pretty(&summary) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => error!(error = %e, "summary serialization failed"),
    }

    if let Ok(url) = std::env::var("SIGNAL_WEBHOOK_URL") {
        let secret = std::env::var("SIGNAL_WEBHOOK_SECRET").unwrap_or_default();
        let sink = Arc::new(InMemoryDeadLetterSink::new());
        let dispatcher = SignalDispatcher::new(
            Arc::new(HttpTransport::default()),
            SignalSigner::new(secret),
            RetrySchedule::default(),
            DISPATCH_MAX_ATTEMPTS,
            sink.clone(),
        );

        for result in &summary.results {
            let Some(decision) = &result.trading_decision else {
                continue;
            };
            if decision.get("action").and_then(|a| a.as_str()) != Some("prepare") {
                continue;
            }
            if let Err(e) = dispatcher.dispatch(&url, decision).await {
                error!(symbol = %result.symbol, error = %e, "signal dispatch failed");
            }
        }
        if !sink.is_empty() {
            info!(pending = sink.len(), "dead letters pending replay");
        }
    }

    info!(status = summary.status.as_str(), "cycle finished");
}
