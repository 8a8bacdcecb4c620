//! # Sift
//!
//! A SQL-flavored query engine for filtering and aggregating structured
//! in-memory records.
//!
//! Sift turns a compact query string like
//! `STATS comments BY state WHERE age_days > 90 AND state = 'open'`
//! into a typed command tree, evaluates its condition against every record
//! of a dataset, and aggregates the selected subset into one of six typed
//! result shapes: distribution, pairwise series, time trend, categorical
//! breakdown, summary statistics, or a record listing.
//!
//! ## Features
//!
//! - **Declarative queries**: boolean conditions with standard precedence,
//!   SQL-style `LIKE`/`IN`/`CONTAINS`, dotted paths into nested fields
//! - **Pure execution**: no I/O, no globals; `parse` and `execute` are
//!   synchronous functions over a read-only dataset
//! - **Graceful degradation**: zero matching records is a value, never an
//!   error
//! - **Typed results**: renderers consume serde-serializable payloads and
//!   own all presentation
//!
//! ## Modules
//!
//! - [`data`]: values, records, datasets, and schemas
//! - [`query`]: parser, condition evaluator, and aggregation engine
//!
//! ## Quick Start
//!
//! ```rust
//! use sift::{Dataset, Executor, Output, Record};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dataset = Dataset::new(vec![
//!         Record::new().field("state", "open").field("comments", 3),
//!         Record::new().field("state", "closed").field("comments", 10),
//!         Record::new().field("state", "open").field("comments", 7),
//!     ]);
//!
//!     let executor = Executor::new(&dataset);
//!     let result = executor.execute_str("STATS comments BY state")?;
//!
//!     match result {
//!         Output::Stats(stats) => println!("grouped by {:?}", stats.group_by),
//!         _ => unreachable!(),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod data;
pub mod query;

// Re-export top-level types for convenience
pub use data::{Dataset, FieldInfo, FieldKind, ListSelect, Record, Schema, Value};

pub use query::{
    parse, Command, CommandBuilder, CommandKind, CompareOp, Comparison, Condition, Executor,
    FieldPath, Literal, Output, QueryError, QueryResult,
};
