//! Recursive rule tree evaluation.

use model::IndicatorContext;
use rust_decimal::Decimal;
use tracing::warn;

use crate::node::{CmpOp, PrevSide, Primitive, RuleNode};
use crate::result::{ConditionMeta, ConditionResult};
use crate::{ConditionRegistry, RuleError};

/// Walks rule trees against one indicator snapshot.
///
/// Evaluation is pure: the only side effect is the diagnostic log on
/// permissive-unknown nodes. Leaf-level data problems fail the condition
/// (recorded in its meta); only an unknown rule name raises.
pub struct Evaluator<'a> {
    registry: &'a ConditionRegistry,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator over the given registry.
    pub fn new(registry: &'a ConditionRegistry) -> Self {
        Self { registry }
    }

    /// Evaluate a node, returning the full diagnostic result.
    pub fn evaluate(
        &self,
        node: &RuleNode,
        ctx: &IndicatorContext,
    ) -> Result<ConditionResult, RuleError> {
        match node {
            RuleNode::NamedRef { name, overrides } => {
                let resolved = self.registry.get(name)?;
                let resolved = match overrides {
                    Some(map) => resolved.with_overrides(map)?,
                    None => resolved.clone(),
                };
                let mut result = self.evaluate(&resolved, ctx)?;
                result.name = name.clone();
                Ok(result)
            }
            // Short-circuits on the first false child; empty is vacuously true.
            RuleNode::AllOf(children) => {
                let mut items = Vec::with_capacity(children.len());
                let mut passed = true;
                for child in children {
                    let item = self.evaluate(child, ctx)?;
                    let child_passed = item.passed;
                    items.push(item);
                    if !child_passed {
                        passed = false;
                        break;
                    }
                }
                Ok(ConditionResult::composite("all_of", passed, items))
            }
            // Short-circuits on the first true child; empty is false.
            RuleNode::AnyOf(children) => {
                let mut items = Vec::with_capacity(children.len());
                let mut passed = false;
                for child in children {
                    let item = self.evaluate(child, ctx)?;
                    let child_passed = item.passed;
                    items.push(item);
                    if child_passed {
                        passed = true;
                        break;
                    }
                }
                Ok(ConditionResult::composite("any_of", passed, items))
            }
            RuleNode::Primitive(prim) => Ok(eval_primitive(prim, ctx)),
            RuleNode::PermissiveUnknown { kind } => {
                warn!(kind = %kind, "unimplemented rule kind, permissive pass");
                Ok(ConditionResult::leaf(
                    kind.clone(),
                    true,
                    None,
                    None,
                    ConditionMeta::reason("permissive_unknown"),
                ))
            }
        }
    }

    /// Evaluate a node to its boolean verdict.
    pub fn evaluate_bool(
        &self,
        node: &RuleNode,
        ctx: &IndicatorContext,
    ) -> Result<bool, RuleError> {
        Ok(self.evaluate(node, ctx)?.passed)
    }
}

fn eval_primitive(prim: &Primitive, ctx: &IndicatorContext) -> ConditionResult {
    let kind = prim.kind();
    match prim {
        Primitive::FieldLt { a, b } | Primitive::FieldGt { a, b } => {
            let (Some(va), Some(vb)) = (ctx.value(a), ctx.value(b)) else {
                let missing = if ctx.value(a).is_none() { a } else { b };
                return ConditionResult::leaf(kind, false, None, None, ConditionMeta::missing(missing));
            };
            let passed = match prim {
                Primitive::FieldLt { .. } => va < vb,
                _ => va > vb,
            };
            ConditionResult::leaf(kind, passed, Some(va), Some(vb), ConditionMeta::default())
        }
        Primitive::OpCmp {
            op,
            left,
            right,
            eps,
        } => {
            let Some(value) = ctx.value(left) else {
                return ConditionResult::leaf(kind, false, None, Some(*right), ConditionMeta::missing(left));
            };
            // Tolerance band: values within eps of the literal compare as equal.
            let snapped = *eps > Decimal::ZERO && (value - right).abs() < *eps;
            let effective = if snapped { *right } else { value };
            let passed = op.apply(effective, *right);
            let meta = if snapped {
                ConditionMeta::reason("eps_snapped")
            } else {
                ConditionMeta::default()
            };
            ConditionResult::leaf(kind, passed, Some(value), Some(*right), meta)
        }
        Primitive::ScalarCmp { field, lt, gt } => {
            let Some(value) = ctx.value(field) else {
                return ConditionResult::leaf(kind, false, None, lt.or(*gt), ConditionMeta::missing(field));
            };
            let passed = lt.map_or(true, |bound| value < bound) && gt.map_or(true, |bound| value > bound);
            ConditionResult::leaf(kind, passed, Some(value), lt.or(*gt), ConditionMeta::default())
        }
        Primitive::TrendIncreasing {
            field,
            n,
            strict,
            eps,
        } => eval_trend(kind, ctx, field, *n, *strict, *eps, true),
        Primitive::TrendDecreasing {
            field,
            n,
            strict,
            eps,
        } => eval_trend(kind, ctx, field, *n, *strict, *eps, false),
        Primitive::DerivativeGt {
            field,
            threshold,
            persist_n,
        } => eval_derivative(kind, ctx, field, *threshold, *persist_n, CmpOp::Gt),
        Primitive::DerivativeLt {
            field,
            threshold,
            persist_n,
        } => eval_derivative(kind, ctx, field, *threshold, *persist_n, CmpOp::Lt),
        Primitive::CrossWithHysteresis {
            field,
            min_gap,
            cool_down_bars,
            require_prev,
        } => eval_cross(kind, ctx, field, *min_gap, *cool_down_bars, *require_prev),
    }
}

/// First differences of a newest-first series: `diffs[i] = s[i] - s[i+1]`
/// (newer minus older), so a positive diff means the value rose.
fn first_diffs(series: &[Decimal], count: usize) -> Vec<Decimal> {
    (0..count).map(|i| series[i] - series[i + 1]).collect()
}

fn eval_trend(
    kind: &str,
    ctx: &IndicatorContext,
    field: &str,
    n: usize,
    strict: bool,
    eps: Decimal,
    increasing: bool,
) -> ConditionResult {
    let Some(series) = ctx.series(field) else {
        return ConditionResult::leaf(kind, false, None, None, ConditionMeta::missing(field));
    };
    if series.len() < n + 1 {
        return ConditionResult::leaf(kind, false, None, None, ConditionMeta::missing(field));
    }

    let diffs = first_diffs(series, n);
    let passed = diffs.iter().all(|d| match (increasing, strict) {
        // Strict: a diff inside the eps band counts as flat, not monotonic.
        (true, true) => *d > eps,
        (true, false) => *d >= -eps,
        (false, true) => *d < -eps,
        (false, false) => *d <= eps,
    });

    let meta = ConditionMeta {
        diffs: Some(diffs),
        comparisons: Some(n as u32),
        ..ConditionMeta::default()
    };
    ConditionResult::leaf(kind, passed, series.first().copied(), None, meta)
}

fn eval_derivative(
    kind: &str,
    ctx: &IndicatorContext,
    field: &str,
    threshold: Decimal,
    persist_n: usize,
    op: CmpOp,
) -> ConditionResult {
    let series = ctx.series(field).unwrap_or(&[]);
    if series.len() < persist_n + 1 {
        return ConditionResult::leaf(
            kind,
            false,
            None,
            Some(threshold),
            ConditionMeta::reason("insufficient_points"),
        );
    }

    let diffs = first_diffs(series, persist_n);
    let passed = diffs.iter().all(|d| op.apply(*d, threshold));

    let meta = ConditionMeta {
        diffs: Some(diffs.clone()),
        comparisons: Some(persist_n as u32),
        ..ConditionMeta::default()
    };
    ConditionResult::leaf(kind, passed, diffs.first().copied(), Some(threshold), meta)
}

fn eval_cross(
    kind: &str,
    ctx: &IndicatorContext,
    field: &str,
    min_gap: Decimal,
    cool_down_bars: usize,
    require_prev: PrevSide,
) -> ConditionResult {
    let series = ctx.series(field).unwrap_or(&[]);
    if series.len() < 2 {
        return ConditionResult::leaf(kind, false, None, None, ConditionMeta::missing(field));
    }

    // Walk oldest to newest tracking which side of the hysteresis band
    // (±min_gap) the series last left; jitter inside the band is ignored.
    let mut side: Option<PrevSide> = None;
    let mut last_cross: Option<usize> = None;
    for idx in (0..series.len()).rev() {
        let value = series[idx];
        let current = if value > min_gap {
            Some(PrevSide::Above)
        } else if value < -min_gap {
            Some(PrevSide::Below)
        } else {
            None
        };
        if let Some(current) = current {
            let crossed = match (require_prev, side) {
                (PrevSide::Below, Some(PrevSide::Below)) => current == PrevSide::Above,
                (PrevSide::Above, Some(PrevSide::Above)) => current == PrevSide::Below,
                _ => false,
            };
            if crossed {
                last_cross = Some(idx);
            }
            side = Some(current);
        }
    }

    match last_cross {
        Some(bars) if bars <= cool_down_bars => {
            let meta = ConditionMeta {
                bars_since_cross: Some(bars),
                ..ConditionMeta::default()
            };
            ConditionResult::leaf(kind, true, series.first().copied(), None, meta)
        }
        other => {
            let meta = ConditionMeta {
                bars_since_cross: other,
                reason: Some("no_recent_cross".to_string()),
                ..ConditionMeta::default()
            };
            ConditionResult::leaf(kind, false, series.first().copied(), None, meta)
        }
    }
}
