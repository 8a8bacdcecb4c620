//! Dataset schema
//!
//! Per-field type declarations and the list-selection policy for nested
//! paths. The schema is either declared by the data provider or inferred
//! once when the dataset is built, from the first non-null occurrence of
//! each field. Nothing here is re-derived per record during evaluation.

use crate::data::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declared type of a top-level field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Bool,
    Int,
    Float,
    String,
    Timestamp,
    List,
    Map,
    /// Field exists but no non-null value was seen
    Unknown,
}

impl FieldKind {
    /// Kind of a concrete value (Null maps to Unknown)
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => FieldKind::Unknown,
            Value::Bool(_) => FieldKind::Bool,
            Value::Int(_) => FieldKind::Int,
            Value::Float(_) => FieldKind::Float,
            Value::String(_) => FieldKind::String,
            Value::Timestamp(_) => FieldKind::Timestamp,
            Value::List(_) => FieldKind::List,
            Value::Map(_) => FieldKind::Map,
        }
    }

    /// True for Int and Float
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::Int | FieldKind::Float)
    }
}

/// How to pick one element out of a list-valued field when a nested path
/// reaches into it.
///
/// The default, `First`, takes the first element in list order. `ByRank`
/// picks the element (a map) whose named key holds the greatest numeric
/// value, for lists kept sorted by relevance rather than position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListSelect {
    /// First element in list order (the default policy)
    First,
    /// Element whose `key` field holds the greatest numeric value
    ByRank(String),
}

impl Default for ListSelect {
    fn default() -> Self {
        ListSelect::First
    }
}

/// Field declarations for one dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    fields: BTreeMap<String, FieldKind>,
    #[serde(default)]
    list_select: BTreeMap<String, ListSelect>,
}

impl Schema {
    /// Empty schema, to be filled with `declare`
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field's kind, replacing any prior declaration
    pub fn declare(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(name.into(), kind);
        self
    }

    /// Set the list-selection policy for a list-valued field
    pub fn list_select(mut self, field: impl Into<String>, policy: ListSelect) -> Self {
        self.list_select.insert(field.into(), policy);
        self
    }

    /// True if the field name is known to this schema
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Declared kind of a field
    pub fn kind(&self, name: &str) -> Option<FieldKind> {
        self.fields.get(name).copied()
    }

    /// List-selection policy for a field (`First` unless overridden)
    pub fn list_select_for(&self, field: &str) -> &ListSelect {
        static FIRST: ListSelect = ListSelect::First;
        self.list_select.get(field).unwrap_or(&FIRST)
    }

    /// Names of all declared fields, sorted
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|s| s.as_str())
    }

    /// Record a field sighting during inference. The first non-null value
    /// wins; later sightings only upgrade an Unknown.
    pub(crate) fn observe(&mut self, name: &str, value: &Value) {
        let kind = FieldKind::of(value);
        match self.fields.get(name) {
            None => {
                self.fields.insert(name.to_string(), kind);
            }
            Some(FieldKind::Unknown) if kind != FieldKind::Unknown => {
                self.fields.insert(name.to_string(), kind);
            }
            Some(_) => {}
        }
    }
}
