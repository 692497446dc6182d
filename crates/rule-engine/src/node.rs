//! Rule tree nodes and their JSON parsing.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::RuleError;

/// Default field for `scalar_cmp` when none is configured.
const SCALAR_CMP_DEFAULT_FIELD: &str = "rsi";

/// Comparison operators for `op_cmp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

impl CmpOp {
    fn parse(s: &str) -> Result<Self, RuleError> {
        match s {
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Ge),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Le),
            "==" => Ok(Self::Eq),
            "!=" => Ok(Self::Ne),
            _ => Err(RuleError::InvalidConfig(format!("unknown operator '{s}'"))),
        }
    }

    /// Apply the operator to two values.
    pub fn apply(&self, left: Decimal, right: Decimal) -> bool {
        match self {
            Self::Gt => left > right,
            Self::Ge => left >= right,
            Self::Lt => left < right,
            Self::Le => left <= right,
            Self::Eq => left == right,
            Self::Ne => left != right,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }
}

/// Which side of the hysteresis band the series must have come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrevSide {
    Below,
    Above,
}

/// A primitive (leaf) comparator.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// `indicators[a] < indicators[b]`; missing key fails closed.
    FieldLt { a: String, b: String },
    /// `indicators[a] > indicators[b]`; missing key fails closed.
    FieldGt { a: String, b: String },
    /// `indicators[left] <op> right`, with an equality tolerance band: when
    /// `eps > 0` and `|left - right| < eps`, left snaps to right first.
    OpCmp {
        op: CmpOp,
        left: String,
        right: Decimal,
        eps: Decimal,
    },
    /// Inline bounds on one field (defaults to `rsi`).
    ScalarCmp {
        field: String,
        lt: Option<Decimal>,
        gt: Option<Decimal>,
    },
    /// Last `n` consecutive differences of `{field}_series` all increasing.
    TrendIncreasing {
        field: String,
        n: usize,
        strict: bool,
        eps: Decimal,
    },
    /// Last `n` consecutive differences of `{field}_series` all decreasing.
    TrendDecreasing {
        field: String,
        n: usize,
        strict: bool,
        eps: Decimal,
    },
    /// Last `persist_n` first differences all above `threshold`.
    DerivativeGt {
        field: String,
        threshold: Decimal,
        persist_n: usize,
    },
    /// Last `persist_n` first differences all below `threshold`.
    DerivativeLt {
        field: String,
        threshold: Decimal,
        persist_n: usize,
    },
    /// Most recent band cross happened within `cool_down_bars` of now.
    CrossWithHysteresis {
        field: String,
        min_gap: Decimal,
        cool_down_bars: usize,
        require_prev: PrevSide,
    },
}

impl Primitive {
    /// Machine-readable kind name, matching the configuration value.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FieldLt { .. } => "field_lt",
            Self::FieldGt { .. } => "field_gt",
            Self::OpCmp { .. } => "op_cmp",
            Self::ScalarCmp { .. } => "scalar_cmp",
            Self::TrendIncreasing { .. } => "trend_increasing",
            Self::TrendDecreasing { .. } => "trend_decreasing",
            Self::DerivativeGt { .. } => "derivative_gt",
            Self::DerivativeLt { .. } => "derivative_lt",
            Self::CrossWithHysteresis { .. } => "cross_with_hysteresis",
        }
    }
}

/// A node of the rule tree.
///
/// Built once from configuration and immutable afterwards. Named references
/// are resolved lazily at evaluation time; a reference cycle is a caller
/// error, not statically detected.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleNode {
    /// Reference to a named rule in the registry, with optional shallow
    /// overrides merged into the resolved definition before recursing.
    NamedRef {
        name: String,
        overrides: Option<Map<String, Value>>,
    },
    /// All children must pass; empty list is vacuously true.
    AllOf(Vec<RuleNode>),
    /// At least one child must pass; empty list is false.
    AnyOf(Vec<RuleNode>),
    /// A leaf comparator.
    Primitive(Primitive),
    /// A primitive kind the engine does not implement yet. Evaluates to
    /// `true` with a loud diagnostic; see the crate docs.
    PermissiveUnknown { kind: String },
}

impl RuleNode {
    /// Parse a node from its JSON configuration form.
    ///
    /// Accepted shapes:
    /// - `{"rule": "<name>", "overrides": {..}}`
    /// - `{"all_of": [..]}` / `{"any_of": [..]}`
    /// - `{"kind": "<primitive-kind>", ..params}`
    pub fn from_json(value: &Value) -> Result<Self, RuleError> {
        let obj = value
            .as_object()
            .ok_or_else(|| RuleError::InvalidConfig("rule node must be an object".into()))?;

        if let Some(name) = obj.get("rule") {
            let name = as_str(name, "rule")?;
            let overrides = match obj.get("overrides") {
                Some(Value::Object(map)) => Some(map.clone()),
                Some(_) => {
                    return Err(RuleError::InvalidConfig(
                        "overrides must be an object".into(),
                    ))
                }
                None => None,
            };
            return Ok(Self::NamedRef {
                name: name.to_string(),
                overrides,
            });
        }

        if let Some(children) = obj.get("all_of") {
            return Ok(Self::AllOf(parse_children(children, "all_of")?));
        }
        if let Some(children) = obj.get("any_of") {
            return Ok(Self::AnyOf(parse_children(children, "any_of")?));
        }

        if let Some(kind) = obj.get("kind") {
            let kind = as_str(kind, "kind")?;
            return Self::parse_primitive(kind, obj);
        }

        Err(RuleError::InvalidConfig(
            "rule node has none of 'rule', 'all_of', 'any_of', 'kind'".into(),
        ))
    }

    fn parse_primitive(kind: &str, obj: &Map<String, Value>) -> Result<Self, RuleError> {
        let prim = match kind {
            "field_lt" | "field_gt" => {
                let (a, b) = field_pair(obj)?;
                if kind == "field_lt" {
                    Primitive::FieldLt { a, b }
                } else {
                    Primitive::FieldGt { a, b }
                }
            }
            "op_cmp" => Primitive::OpCmp {
                op: CmpOp::parse(req_str(obj, "op")?)?,
                left: req_str(obj, "left")?.to_string(),
                right: req_decimal(obj, "right")?,
                eps: opt_decimal(obj, "eps")?.unwrap_or(Decimal::ZERO),
            },
            "scalar_cmp" => Primitive::ScalarCmp {
                field: obj
                    .get("field")
                    .map(|v| as_str(v, "field").map(str::to_string))
                    .transpose()?
                    .unwrap_or_else(|| SCALAR_CMP_DEFAULT_FIELD.to_string()),
                lt: opt_decimal(obj, "lt")?,
                gt: opt_decimal(obj, "gt")?,
            },
            "trend_increasing" | "trend_decreasing" => {
                let field = req_str(obj, "field")?.to_string();
                let n = req_usize(obj, "n")?;
                let strict = obj.get("strict").and_then(Value::as_bool).unwrap_or(true);
                let eps = opt_decimal(obj, "eps")?.unwrap_or(Decimal::ZERO);
                if kind == "trend_increasing" {
                    Primitive::TrendIncreasing {
                        field,
                        n,
                        strict,
                        eps,
                    }
                } else {
                    Primitive::TrendDecreasing {
                        field,
                        n,
                        strict,
                        eps,
                    }
                }
            }
            "derivative_gt" | "derivative_lt" => {
                let field = req_str(obj, "field")?.to_string();
                let threshold = req_decimal(obj, "threshold")?;
                let persist_n = req_usize(obj, "persist_n")?.max(1);
                if kind == "derivative_gt" {
                    Primitive::DerivativeGt {
                        field,
                        threshold,
                        persist_n,
                    }
                } else {
                    Primitive::DerivativeLt {
                        field,
                        threshold,
                        persist_n,
                    }
                }
            }
            "cross_with_hysteresis" => {
                let require_prev = if obj
                    .get("require_prev_above")
                    .and_then(Value::as_bool)
                    .unwrap_or(false)
                {
                    PrevSide::Above
                } else {
                    PrevSide::Below
                };
                Primitive::CrossWithHysteresis {
                    field: req_str(obj, "field")?.to_string(),
                    min_gap: opt_decimal(obj, "min_gap")?.unwrap_or(Decimal::ZERO),
                    cool_down_bars: req_usize(obj, "cool_down_bars")?,
                    require_prev,
                }
            }
            other => {
                return Ok(Self::PermissiveUnknown {
                    kind: other.to_string(),
                })
            }
        };

        Ok(Self::Primitive(prim))
    }

    /// Re-parse this node with an override map shallow-merged into its JSON
    /// form. Used by `NamedRef` resolution.
    pub fn with_overrides(&self, overrides: &Map<String, Value>) -> Result<Self, RuleError> {
        let mut base = self.to_json();
        let obj = base
            .as_object_mut()
            .ok_or_else(|| RuleError::InvalidConfig("cannot override a non-object rule".into()))?;
        for (key, value) in overrides {
            obj.insert(key.clone(), value.clone());
        }
        Self::from_json(&base)
    }

    /// The JSON configuration form of this node.
    pub fn to_json(&self) -> Value {
        match self {
            Self::NamedRef { name, overrides } => {
                let mut obj = Map::new();
                obj.insert("rule".into(), Value::String(name.clone()));
                if let Some(map) = overrides {
                    obj.insert("overrides".into(), Value::Object(map.clone()));
                }
                Value::Object(obj)
            }
            Self::AllOf(children) => {
                serde_json::json!({ "all_of": children.iter().map(Self::to_json).collect::<Vec<_>>() })
            }
            Self::AnyOf(children) => {
                serde_json::json!({ "any_of": children.iter().map(Self::to_json).collect::<Vec<_>>() })
            }
            Self::Primitive(prim) => prim_to_json(prim),
            Self::PermissiveUnknown { kind } => serde_json::json!({ "kind": kind }),
        }
    }
}

impl<'de> Deserialize<'de> for RuleNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}

fn prim_to_json(prim: &Primitive) -> Value {
    match prim {
        Primitive::FieldLt { a, b } | Primitive::FieldGt { a, b } => {
            serde_json::json!({ "kind": prim.kind(), "fields": [a, b] })
        }
        Primitive::OpCmp {
            op,
            left,
            right,
            eps,
        } => serde_json::json!({
            "kind": "op_cmp", "op": op.as_str(), "left": left, "right": right, "eps": eps,
        }),
        Primitive::ScalarCmp { field, lt, gt } => {
            let mut obj = Map::new();
            obj.insert("kind".into(), "scalar_cmp".into());
            obj.insert("field".into(), field.as_str().into());
            if let Some(lt) = lt {
                obj.insert("lt".into(), serde_json::json!(lt));
            }
            if let Some(gt) = gt {
                obj.insert("gt".into(), serde_json::json!(gt));
            }
            Value::Object(obj)
        }
        Primitive::TrendIncreasing {
            field,
            n,
            strict,
            eps,
        }
        | Primitive::TrendDecreasing {
            field,
            n,
            strict,
            eps,
        } => serde_json::json!({
            "kind": prim.kind(), "field": field, "n": n, "strict": strict, "eps": eps,
        }),
        Primitive::DerivativeGt {
            field,
            threshold,
            persist_n,
        }
        | Primitive::DerivativeLt {
            field,
            threshold,
            persist_n,
        } => serde_json::json!({
            "kind": prim.kind(), "field": field, "threshold": threshold, "persist_n": persist_n,
        }),
        Primitive::CrossWithHysteresis {
            field,
            min_gap,
            cool_down_bars,
            require_prev,
        } => serde_json::json!({
            "kind": "cross_with_hysteresis",
            "field": field,
            "min_gap": min_gap,
            "cool_down_bars": cool_down_bars,
            "require_prev_above": matches!(require_prev, PrevSide::Above),
        }),
    }
}

fn parse_children(value: &Value, key: &str) -> Result<Vec<RuleNode>, RuleError> {
    let arr = value
        .as_array()
        .ok_or_else(|| RuleError::InvalidConfig(format!("'{key}' must be an array")))?;
    arr.iter().map(RuleNode::from_json).collect()
}

fn field_pair(obj: &Map<String, Value>) -> Result<(String, String), RuleError> {
    let arr = obj
        .get("fields")
        .and_then(Value::as_array)
        .ok_or_else(|| RuleError::InvalidConfig("'fields' must be a two-element array".into()))?;
    match arr.as_slice() {
        [a, b] => Ok((
            as_str(a, "fields[0]")?.to_string(),
            as_str(b, "fields[1]")?.to_string(),
        )),
        _ => Err(RuleError::InvalidConfig(
            "'fields' must hold exactly two keys".into(),
        )),
    }
}

fn as_str<'a>(value: &'a Value, key: &str) -> Result<&'a str, RuleError> {
    value
        .as_str()
        .ok_or_else(|| RuleError::InvalidConfig(format!("'{key}' must be a string")))
}

fn req_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a str, RuleError> {
    obj.get(key)
        .ok_or_else(|| RuleError::InvalidConfig(format!("missing '{key}'")))
        .and_then(|v| as_str(v, key))
}

fn req_decimal(obj: &Map<String, Value>, key: &str) -> Result<Decimal, RuleError> {
    opt_decimal(obj, key)?.ok_or_else(|| RuleError::InvalidConfig(format!("missing '{key}'")))
}

fn opt_decimal(obj: &Map<String, Value>, key: &str) -> Result<Option<Decimal>, RuleError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| RuleError::InvalidConfig(format!("'{key}' is not numeric: {e}"))),
    }
}

fn req_usize(obj: &Map<String, Value>, key: &str) -> Result<usize, RuleError> {
    obj.get(key)
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .ok_or_else(|| RuleError::InvalidConfig(format!("'{key}' must be a non-negative integer")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_named_ref_with_overrides() {
        let node = RuleNode::from_json(&serde_json::json!({
            "rule": "macd_positive",
            "overrides": { "right": 0.5 }
        }))
        .unwrap();

        match node {
            RuleNode::NamedRef { name, overrides } => {
                assert_eq!(name, "macd_positive");
                assert!(overrides.unwrap().contains_key("right"));
            }
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn test_parse_composites() {
        let node = RuleNode::from_json(&serde_json::json!({
            "all_of": [
                { "kind": "field_gt", "fields": ["ema_fast", "ema_slow"] },
                { "any_of": [ { "kind": "scalar_cmp", "gt": 50 } ] }
            ]
        }))
        .unwrap();

        match node {
            RuleNode::AllOf(children) => {
                assert_eq!(children.len(), 2);
                assert!(matches!(children[1], RuleNode::AnyOf(_)));
            }
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn test_parse_op_cmp() {
        let node = RuleNode::from_json(&serde_json::json!({
            "kind": "op_cmp", "op": ">", "left": "macd.hist", "right": 0.0, "eps": 0.000001
        }))
        .unwrap();

        match node {
            RuleNode::Primitive(Primitive::OpCmp {
                op, left, right, ..
            }) => {
                assert_eq!(op, CmpOp::Gt);
                assert_eq!(left, "macd.hist");
                assert_eq!(right, Decimal::ZERO);
            }
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn test_scalar_cmp_defaults_to_rsi() {
        let node =
            RuleNode::from_json(&serde_json::json!({ "kind": "scalar_cmp", "lt": 30 })).unwrap();
        match node {
            RuleNode::Primitive(Primitive::ScalarCmp { field, lt, gt }) => {
                assert_eq!(field, "rsi");
                assert_eq!(lt, Some(dec!(30)));
                assert_eq!(gt, None);
            }
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_kind_is_permissive() {
        let node = RuleNode::from_json(&serde_json::json!({
            "kind": "volume_profile_poc", "lookback": 20
        }))
        .unwrap();
        assert_eq!(
            node,
            RuleNode::PermissiveUnknown {
                kind: "volume_profile_poc".into()
            }
        );
    }

    #[test]
    fn test_invalid_shapes_rejected() {
        assert!(RuleNode::from_json(&serde_json::json!(42)).is_err());
        assert!(RuleNode::from_json(&serde_json::json!({})).is_err());
        assert!(RuleNode::from_json(&serde_json::json!({ "all_of": 3 })).is_err());
        assert!(
            RuleNode::from_json(&serde_json::json!({ "kind": "op_cmp", "op": "~", "left": "x", "right": 0 }))
                .is_err()
        );
    }

    #[test]
    fn test_overrides_change_threshold() {
        let base = RuleNode::from_json(&serde_json::json!({
            "kind": "op_cmp", "op": ">", "left": "rsi", "right": 50
        }))
        .unwrap();

        let mut overrides = Map::new();
        overrides.insert("right".into(), serde_json::json!(70));
        let merged = base.with_overrides(&overrides).unwrap();

        match merged {
            RuleNode::Primitive(Primitive::OpCmp { right, .. }) => {
                assert_eq!(right, dec!(70));
            }
            other => panic!("unexpected node: {other:?}"),
        }
    }
}
