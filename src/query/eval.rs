//! Condition Evaluator
//!
//! Walks a Condition tree against every record and produces a boolean
//! selection mask in dataset order. Masks are total functions: a comparison
//! that cannot apply to a record (mismatched types, Null value) fails that
//! record to `false` instead of raising.
//!
//! Per-comparison work that does not depend on the record — path validation,
//! LIKE pattern compilation, literal coercion, the CONTAINS list-vs-scalar
//! decision — happens once, before the record loop.

use crate::data::{Dataset, FieldKind, Value};
use crate::query::ast::{CompareOp, Comparison, Condition, Literal, Operand};
use crate::query::error::{QueryError, QueryResult};
use crate::query::resolve;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use std::cmp::Ordering;

/// Evaluate a condition over the whole dataset, yielding one boolean per
/// record in dataset order.
pub fn evaluate(dataset: &Dataset, condition: &Condition) -> QueryResult<Vec<bool>> {
    match condition {
        Condition::Comparison(cmp) => evaluate_comparison(dataset, cmp),
        Condition::And(left, right) => {
            let l = evaluate(dataset, left)?;
            let r = evaluate(dataset, right)?;
            Ok(l.into_iter().zip(r).map(|(a, b)| a && b).collect())
        }
        Condition::Or(left, right) => {
            let l = evaluate(dataset, left)?;
            let r = evaluate(dataset, right)?;
            Ok(l.into_iter().zip(r).map(|(a, b)| a || b).collect())
        }
        Condition::Not(inner) => {
            let mask = evaluate(dataset, inner)?;
            Ok(mask.into_iter().map(|b| !b).collect())
        }
    }
}

fn evaluate_comparison(dataset: &Dataset, cmp: &Comparison) -> QueryResult<Vec<bool>> {
    resolve::check_path(dataset.schema(), &cmp.field)?;

    let kind = resolve::leaf_kind(dataset, &cmp.field);
    let matcher = Matcher::compile(cmp, kind)?;

    Ok(dataset
        .records()
        .iter()
        .map(|record| {
            let value = resolve::resolve(record, &cmp.field, dataset.schema());
            matcher.matches(&value)
        })
        .collect())
}

/// A comparison compiled against the field's declared kind
enum Matcher {
    /// `= == != <> < <= > >=` against a pre-coerced target
    Cmp { op: CompareOp, rhs: Value },
    /// LIKE with the wildcard pattern compiled to an anchored regex
    Like(Regex),
    /// IN against pre-coerced targets
    In(Vec<Value>),
    /// CONTAINS on a List-kinded field: element equality
    ContainsElement(Value),
    /// CONTAINS on a scalar-kinded field: case-insensitive substring
    ContainsSubstring(String),
}

impl Matcher {
    fn compile(cmp: &Comparison, kind: FieldKind) -> QueryResult<Self> {
        match cmp.op {
            CompareOp::Eq | CompareOp::Ne | CompareOp::Lt | CompareOp::Le | CompareOp::Gt
            | CompareOp::Ge => {
                let lit = scalar_operand(cmp)?;
                Ok(Matcher::Cmp {
                    op: cmp.op,
                    rhs: coerce_literal(lit, kind),
                })
            }
            CompareOp::Like => {
                let lit = scalar_operand(cmp)?;
                Ok(Matcher::Like(like_regex(&lit.to_string())?))
            }
            CompareOp::In => {
                let values = match &cmp.rhs {
                    Operand::List(items) => items.as_slice(),
                    Operand::Scalar(lit) => std::slice::from_ref(lit),
                };
                Ok(Matcher::In(
                    values.iter().map(|lit| coerce_literal(lit, kind)).collect(),
                ))
            }
            CompareOp::Contains => {
                let lit = scalar_operand(cmp)?;
                if kind == FieldKind::List {
                    Ok(Matcher::ContainsElement(coerce_literal(lit, FieldKind::Unknown)))
                } else {
                    Ok(Matcher::ContainsSubstring(lit.to_string().to_lowercase()))
                }
            }
        }
    }

    /// Apply to one resolved value. Null never matches anything.
    fn matches(&self, value: &Value) -> bool {
        if value.is_null() {
            return false;
        }

        match self {
            Matcher::Cmp { op, rhs } => match op {
                CompareOp::Eq => values_equal(value, rhs),
                CompareOp::Ne => !values_equal(value, rhs),
                CompareOp::Lt => ordering_of(value, rhs) == Some(Ordering::Less),
                CompareOp::Le => matches!(
                    ordering_of(value, rhs),
                    Some(Ordering::Less | Ordering::Equal)
                ),
                CompareOp::Gt => ordering_of(value, rhs) == Some(Ordering::Greater),
                CompareOp::Ge => matches!(
                    ordering_of(value, rhs),
                    Some(Ordering::Greater | Ordering::Equal)
                ),
                // list-valued RHS never reaches Matcher::Cmp
                _ => false,
            },
            Matcher::Like(regex) => match value {
                Value::List(_) | Value::Map(_) => false,
                scalar => regex.is_match(&scalar.to_string()),
            },
            Matcher::In(targets) => targets.iter().any(|t| values_equal(value, t)),
            Matcher::ContainsElement(target) => match value {
                Value::List(items) => items.iter().any(|item| values_equal(item, target)),
                _ => false,
            },
            Matcher::ContainsSubstring(needle) => match value {
                Value::List(_) | Value::Map(_) => false,
                scalar => scalar.to_string().to_lowercase().contains(needle.as_str()),
            },
        }
    }
}

fn scalar_operand(cmp: &Comparison) -> QueryResult<&Literal> {
    match &cmp.rhs {
        Operand::Scalar(lit) => Ok(lit),
        Operand::List(_) => Err(QueryError::UnsupportedOperator {
            op: cmp.op.to_string(),
            context: "only IN takes a value list".to_string(),
        }),
    }
}

/// Turn a literal into the comparison target, coercing by field kind:
/// a String literal `true`/`false` against a Bool field becomes Bool, and
/// a String literal against a Timestamp field is parsed as RFC 3339 or
/// `YYYY-MM-DD`. Unparseable timestamps stay Strings and match nothing.
fn coerce_literal(lit: &Literal, kind: FieldKind) -> Value {
    match (lit, kind) {
        (Literal::String(s), FieldKind::Bool) => {
            if s.eq_ignore_ascii_case("true") {
                Value::Bool(true)
            } else if s.eq_ignore_ascii_case("false") {
                Value::Bool(false)
            } else {
                Value::String(s.clone())
            }
        }
        (Literal::String(s), FieldKind::Timestamp) => parse_timestamp(s)
            .map(Value::Timestamp)
            .unwrap_or_else(|| Value::String(s.clone())),
        (Literal::Bool(b), _) => Value::Bool(*b),
        (Literal::Int(n), _) => Value::Int(*n),
        (Literal::Float(x), _) => Value::Float(*x),
        (Literal::String(s), _) => Value::String(s.clone()),
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Equality after coercion. Values of incompatible types are unequal,
/// never an error.
fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
        (a, b) if a.is_numeric() && b.is_numeric() => {
            // both sides numeric, as_f64 cannot fail
            a.as_f64() == b.as_f64()
        }
        _ => false,
    }
}

/// Ordering for `< <= > >=`. None for incompatible types, which fails the
/// record's predicate to `false` and keeps the mask total.
fn ordering_of(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
        (a, b) if a.is_numeric() && b.is_numeric() => a.as_f64()?.partial_cmp(&b.as_f64()?),
        _ => None,
    }
}

/// Compile a SQL wildcard pattern: `%` matches any run, `_` exactly one
/// character; the match is case-insensitive and anchored over the whole
/// value.
fn like_regex(pattern: &str) -> QueryResult<Regex> {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push_str("(?i)^");
    for c in pattern.chars() {
        match c {
            '%' => expr.push_str(".*"),
            '_' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');

    Regex::new(&expr).map_err(|e| QueryError::InvalidFilter(format!("LIKE pattern: {}", e)))
}
