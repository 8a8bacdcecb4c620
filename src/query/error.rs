//! Query error types
//!
//! Defines all error conditions that can occur during query parsing and
//! execution. Zero matching records is never an error; every aggregation
//! degrades to an empty result instead.

use thiserror::Error;

/// Errors that can occur during query operations
#[derive(Error, Debug)]
pub enum QueryError {
    /// Query text is malformed; position is the byte offset of the first
    /// unconsumed input
    #[error("parse error at byte {position}: {message}")]
    Parse { position: usize, message: String },

    /// Referenced field does not exist in the dataset schema
    #[error("field not found: {0}")]
    FieldNotFound(String),

    /// Operator used in a position the grammar does not allow. The parser
    /// never produces such trees; this defends hand-built ones.
    #[error("operator {op} is not valid here: {context}")]
    UnsupportedOperator { op: String, context: String },

    /// Invalid filter operand, e.g. an unusable LIKE pattern
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// Command tree violates an internal invariant
    #[error("execution error: {0}")]
    Execution(String),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
