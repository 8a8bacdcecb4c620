//! Sift Query Engine
//!
//! A compact SQL-flavored query language for structured records:
//!
//! - **AST**: command and condition tree types
//! - **Parser**: parse query strings into AST
//! - **Resolver**: dotted field paths into record values
//! - **Evaluator**: condition trees into selection masks
//! - **Executor**: commands into typed outputs
//!
//! # Query Language
//!
//! ```text
//! HIST field [WHERE cond]
//! PLOT field [VS field2] [WHERE cond]
//! TREND field [BY field2] [WHERE cond]
//! BAR field [BY field2] [WHERE cond]
//! STATS field [BY field2] [WHERE cond]
//! IDENTIFY cond
//! IDENTIFY field WHERE cond
//! ```
//!
//! # Examples
//!
//! ## Using a Query String
//!
//! ```rust,ignore
//! use sift::{Dataset, Executor};
//!
//! let executor = Executor::new(&dataset);
//! let result = executor.execute_str(
//!     "STATS comments BY state WHERE age_days > 90 AND state = 'open'"
//! )?;
//! ```
//!
//! ## Using the Command Builder
//!
//! ```rust,ignore
//! use sift::{Command, CompareOp, Comparison, Literal};
//!
//! let command = Command::stats("comments")
//!     .by("state")
//!     .filter(Comparison::new("age_days", CompareOp::Gt, Literal::Int(90)))
//!     .build();
//! let result = executor.execute(&command)?;
//! ```

mod ast;
mod error;
mod eval;
mod executor;
mod output;
mod parser;
mod resolve;

pub use ast::{
    Command, CommandBuilder, CommandKind, CompareOp, Comparison, Condition, FieldPath, Literal,
    Operand,
};
pub use error::{QueryError, QueryResult};
pub use eval::evaluate;
pub use executor::Executor;
pub use output::{
    BarOutput, CategoricalSummary, FieldSummary, HistOutput, IdentifyOutput, NumericSummary,
    Output, PlotOutput, StatsData, StatsOutput, TrendData, TrendOutput, TrendSeries,
};
pub use parser::parse;
pub use resolve::{check_path, leaf_kind, resolve};
