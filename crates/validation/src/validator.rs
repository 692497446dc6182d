//! Side and multi-timeframe validators.

use thiserror::Error;
use tracing::debug;

use model::{IndicatorContext, SignalSide, SymbolResult, SymbolStatus, Timeframe};
use rule_engine::{ConditionRegistry, Evaluator, RuleError};

use crate::config::ValidationConfig;
use crate::provider::{IndicatorProvider, ProviderError};
use crate::report::{MtfReport, SideValidation, TimeframeValidation};

/// Errors aborting one symbol's validation.
///
/// The orchestrator catches these and turns them into that symbol's `Error`
/// result; they never abort a whole run.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Configuration problem (unknown rule name, corrupt definition).
    #[error(transparent)]
    Rule(#[from] RuleError),

    /// The indicator provider failed for a timeframe.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Validation outcome for one symbol: the full diagnostic report plus the
/// condensed `SymbolResult` handed to the decision stage.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub report: MtfReport,
    pub result: SymbolResult,
}

/// Evaluates every configured timeframe for one symbol.
///
/// Holds shared immutable configuration; validation itself is pure and
/// side-effect-free apart from logging, so symbols can be evaluated
/// concurrently against the same validator.
pub struct MtfValidator {
    registry: ConditionRegistry,
    config: ValidationConfig,
}

impl MtfValidator {
    pub fn new(registry: ConditionRegistry, config: ValidationConfig) -> Self {
        Self { registry, config }
    }

    /// Evaluate one side on one timeframe: true on the first passing case,
    /// false when no case is configured or none pass.
    pub fn evaluate_side(
        &self,
        timeframe: Timeframe,
        side: SignalSide,
        ctx: &IndicatorContext,
    ) -> Result<SideValidation, ValidationError> {
        let Some(cases) = self.config.cases(timeframe) else {
            return Ok(SideValidation::unconfigured(side));
        };
        let cases = cases.for_side(side);
        if cases.is_empty() {
            return Ok(SideValidation::unconfigured(side));
        }

        let evaluator = Evaluator::new(&self.registry);
        let mut conditions = Vec::with_capacity(cases.len());
        for case in cases {
            let result = evaluator.evaluate(case, ctx)?;
            let passed = result.passed;
            conditions.push(result);
            if passed {
                break;
            }
        }
        Ok(SideValidation::from_cases(side, cases.len(), conditions))
    }

    /// Run the full multi-timeframe validation for one symbol.
    ///
    /// Every configured timeframe from the start point onward is evaluated
    /// even if an earlier one fails; the caller needs the complete failure
    /// report.
    pub fn validate<P: IndicatorProvider>(
        &self,
        symbol: &str,
        provider: &P,
    ) -> Result<ValidationOutcome, ValidationError> {
        let order = self.config.evaluation_order();
        let mut timeframes = Vec::with_capacity(order.len());
        let mut execution_ctx: Option<IndicatorContext> = None;

        for timeframe in order {
            let ctx = provider.indicator_context(symbol, timeframe)?;
            let long = self.evaluate_side(timeframe, SignalSide::Long, &ctx)?;
            let short = self.evaluate_side(timeframe, SignalSide::Short, &ctx)?;

            debug!(
                symbol = %symbol,
                timeframe = %timeframe,
                long = long.passed,
                short = short.passed,
                "timeframe validated"
            );

            timeframes.push(TimeframeValidation {
                timeframe,
                long,
                short,
            });
            execution_ctx = Some(ctx);
        }

        let report = MtfReport {
            symbol: symbol.to_string(),
            timeframes,
        };
        let result = build_symbol_result(&report, execution_ctx.as_ref());
        Ok(ValidationOutcome { report, result })
    }
}

/// Condense a report into the per-symbol result consumed by the decision
/// stage. Price and ATR are lifted from the execution timeframe's snapshot.
fn build_symbol_result(report: &MtfReport, execution_ctx: Option<&IndicatorContext>) -> SymbolResult {
    SymbolResult {
        symbol: report.symbol.clone(),
        status: SymbolStatus::Success,
        execution_tf: report.execution_timeframe(),
        signal_side: report.confluent_side(),
        current_price: execution_ctx.and_then(|ctx| ctx.value("close")),
        atr: execution_ctx.and_then(|ctx| ctx.value("atr")),
        trading_decision: None,
        error: None,
    }
}
