//! Field Resolver
//!
//! Turns a dotted `FieldPath` into the value it references in one record.
//!
//! A single-segment path is a direct lookup: absent fields yield Null, never
//! an error. Multi-segment paths walk nested Maps key by key; when the walk
//! reaches a List, ONE element is selected per the field's `ListSelect`
//! policy (`First` by default) and the walk continues inside it. An empty
//! list, a non-Map element, or a missing key all yield Null.
//!
//! Path validity against the dataset schema is checked once per query via
//! [`check_path`], not per record.

use crate::data::{Dataset, FieldKind, ListSelect, Record, Schema, Value};
use crate::query::ast::FieldPath;
use crate::query::error::{QueryError, QueryResult};

/// Validate a path against the dataset schema.
///
/// The root segment must name a known field; a nested path additionally
/// requires the root to be List-, Map-, or Unknown-kinded. This is the only
/// place resolution can fail — per-record lookups always degrade to Null.
pub fn check_path(schema: &Schema, path: &FieldPath) -> QueryResult<()> {
    let kind = schema
        .kind(path.root())
        .ok_or_else(|| QueryError::FieldNotFound(path.root().to_string()))?;

    if path.is_nested() && !matches!(kind, FieldKind::List | FieldKind::Map | FieldKind::Unknown) {
        return Err(QueryError::FieldNotFound(path.to_string()));
    }

    Ok(())
}

/// Resolve a path against one record, yielding Null for anything absent
pub fn resolve(record: &Record, path: &FieldPath, schema: &Schema) -> Value {
    let Some(root) = record.get(path.root()) else {
        return Value::Null;
    };

    if !path.is_nested() {
        return root.clone();
    }

    let policy = schema.list_select_for(path.root());
    let mut current = root.clone();

    for segment in path.rest() {
        current = match step_into(current, policy) {
            Value::Map(mut entries) => entries.remove(segment.as_str()).unwrap_or(Value::Null),
            _ => Value::Null,
        };
    }

    current
}

/// Collapse a List down to one element per the selection policy;
/// non-List values pass through.
fn step_into(value: Value, policy: &ListSelect) -> Value {
    match value {
        Value::List(items) => select_element(items, policy),
        other => other,
    }
}

fn select_element(items: Vec<Value>, policy: &ListSelect) -> Value {
    match policy {
        ListSelect::First => items.into_iter().next().unwrap_or(Value::Null),
        ListSelect::ByRank(key) => items
            .into_iter()
            .filter_map(|item| match &item {
                Value::Map(entries) => entries
                    .get(key.as_str())
                    .and_then(Value::as_f64)
                    .map(|rank| (rank, item)),
                _ => None,
            })
            .max_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, item)| item)
            .unwrap_or(Value::Null),
    }
}

/// Kind of the value a path yields, determined once per query.
///
/// For a top-level path this is the schema's declared kind. For a nested
/// path the records are scanned until the first non-null resolved value;
/// its kind wins. All-null paths are Unknown.
pub fn leaf_kind(dataset: &Dataset, path: &FieldPath) -> FieldKind {
    if !path.is_nested() {
        return dataset.schema().kind(path.root()).unwrap_or(FieldKind::Unknown);
    }

    for record in dataset.records() {
        let value = resolve(record, path, dataset.schema());
        if !value.is_null() {
            return FieldKind::of(&value);
        }
    }

    FieldKind::Unknown
}
