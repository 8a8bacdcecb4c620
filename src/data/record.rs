//! Records and datasets
//!
//! A `Record` is one structured data item: an insertion-ordered mapping from
//! field name to `Value`. A `Dataset` is the ordered collection of records a
//! query runs against, together with its inferred or declared `Schema`.
//! Queries only ever borrow a dataset read-only.

use crate::data::schema::{FieldKind, ListSelect, Schema};
use crate::data::value::{Value, ValueKey};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;

/// One structured data item. Field order is preserved as inserted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set a field, replacing any existing value
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a field, replacing any existing value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Iterate fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map of field names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
                let mut record = Record::new();
                while let Some((name, value)) = access.next_entry::<String, Value>()? {
                    record.set(name, value);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

/// Summary of one dataset field, for shells that offer completion or a
/// `fields` listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInfo {
    /// Field name
    pub name: String,
    /// Declared or inferred kind
    pub kind: FieldKind,
    /// Distinct non-null values, when countable (None for List/Map fields)
    pub distinct: Option<usize>,
    /// Up to three sample scalar values
    pub samples: Vec<Value>,
}

/// An ordered collection of records plus its schema.
///
/// Owned by the data provider; the query core borrows it for the duration
/// of a single query and never mutates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<Record>,
    schema: Schema,
    id_field: Option<String>,
}

impl Dataset {
    /// Build a dataset, inferring the schema from the records
    pub fn new(records: Vec<Record>) -> Self {
        let mut schema = Schema::new();
        for record in &records {
            for (name, value) in record.iter() {
                schema.observe(name, value);
            }
        }
        Self {
            records,
            schema,
            id_field: None,
        }
    }

    /// Build a dataset with a provider-declared schema
    pub fn with_schema(records: Vec<Record>, schema: Schema) -> Self {
        Self {
            records,
            schema,
            id_field: None,
        }
    }

    /// Parse a JSON array of objects into a dataset
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let records: Vec<Record> = serde_json::from_str(json)?;
        Ok(Self::new(records))
    }

    /// Builder method: name the identifier column carried through pairwise
    /// plots for point identification
    pub fn id_field(mut self, name: impl Into<String>) -> Self {
        self.id_field = Some(name.into());
        self
    }

    /// Builder method: override the list-selection policy for one field
    pub fn list_select(mut self, field: impl Into<String>, policy: ListSelect) -> Self {
        self.schema = self.schema.list_select(field, policy);
        self
    }

    /// The dataset's schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The identifier column, if one was named
    pub fn id_field_name(&self) -> Option<&str> {
        self.id_field.as_deref()
    }

    /// All records in dataset order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the dataset has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Per-field metadata: kind, distinct count, sample values.
    ///
    /// Distinct counts are omitted for List/Map fields. Samples are the
    /// first three non-null scalar values in dataset order.
    pub fn field_info(&self) -> Vec<FieldInfo> {
        self.schema
            .field_names()
            .map(|name| {
                let kind = self.schema.kind(name).unwrap_or(FieldKind::Unknown);

                let distinct = if matches!(kind, FieldKind::List | FieldKind::Map) {
                    None
                } else {
                    let mut seen = BTreeSet::new();
                    for record in &self.records {
                        if let Some(value) = record.get(name) {
                            if !value.is_null() && value.is_scalar() {
                                seen.insert(ValueKey(value.clone()));
                            }
                        }
                    }
                    Some(seen.len())
                };

                let samples = self
                    .records
                    .iter()
                    .filter_map(|r| r.get(name))
                    .filter(|v| !v.is_null() && v.is_scalar())
                    .take(3)
                    .cloned()
                    .collect();

                FieldInfo {
                    name: name.to_string(),
                    kind,
                    distinct,
                    samples,
                }
            })
            .collect()
    }
}
