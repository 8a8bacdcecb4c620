//! Data model
//!
//! The types a data provider hands to the query core:
//!
//! - **Value**: dynamically typed field contents
//! - **Record**: one ordered field-name → value mapping
//! - **Dataset**: the ordered record collection a query runs against
//! - **Schema**: per-field kind declarations and list-selection policy
//!
//! The core never mutates a dataset; filtering produces index masks and
//! borrowed subsets.

mod record;
mod schema;
mod value;

pub use record::{Dataset, FieldInfo, Record};
pub use schema::{FieldKind, ListSelect, Schema};
pub use value::Value;

pub(crate) use value::ValueKey;
