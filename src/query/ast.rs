//! Query Abstract Syntax Tree
//!
//! Defines the AST for the sift query language, a compact SQL-flavored
//! language for filtering and aggregating structured records.
//!
//! # Example Queries
//!
//! ```text
//! HIST age_days WHERE state = 'open'
//! PLOT comments VS age_days
//! STATS comments BY state WHERE age_days > 90 AND state = 'open'
//! IDENTIFY comments > 10 AND state = 'open'
//! ```
//!
//! Condition and Command trees are immutable once built: a tree is built
//! once per parsed string, consumed by one `execute` call, then discarded.

use serde::{Deserialize, Serialize};

/// Dot-separated reference into a record, possibly nested
/// (e.g. `labels_assigned.label`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Build from explicit segments
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// Parse a dotted path, rejecting empty segments
    pub fn parse(s: &str) -> Option<Self> {
        if s.is_empty() {
            return None;
        }
        let segments: Vec<String> = s.split('.').map(str::to_string).collect();
        if segments.iter().any(|seg| seg.is_empty()) {
            return None;
        }
        Some(Self { segments })
    }

    /// The top-level field name (segment 0)
    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    /// Segments after the root
    pub fn rest(&self) -> &[String] {
        &self.segments[1..]
    }

    /// True when the path reaches into a nested Map or List
    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        Self {
            segments: s.split('.').filter(|seg| !seg.is_empty()).map(str::to_string).collect(),
        }
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// A literal value token from the query text.
///
/// A bare unquoted word other than `true`/`false` parses as a String.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Int(n) => write!(f, "{}", n),
            Literal::Float(x) => write!(f, "{}", x),
            Literal::String(s) => write!(f, "{}", s),
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareOp {
    /// `=` / `==`
    Eq,
    /// `!=` / `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// SQL-style wildcard match anchored over the whole value
    Like,
    /// Membership in a literal list
    In,
    /// List membership or case-insensitive substring, by field kind
    Contains,
}

impl CompareOp {
    /// True for the four ordering operators
    pub fn is_ordering(&self) -> bool {
        matches!(self, CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge)
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "="),
            CompareOp::Ne => write!(f, "!="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Le => write!(f, "<="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Ge => write!(f, ">="),
            CompareOp::Like => write!(f, "LIKE"),
            CompareOp::In => write!(f, "IN"),
            CompareOp::Contains => write!(f, "CONTAINS"),
        }
    }
}

/// Right-hand side of a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    Scalar(Literal),
    List(Vec<Literal>),
}

/// A single field-operator-value predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub field: FieldPath,
    pub op: CompareOp,
    pub rhs: Operand,
}

impl Comparison {
    /// Build a scalar comparison
    pub fn new(field: impl Into<FieldPath>, op: CompareOp, rhs: Literal) -> Self {
        Self {
            field: field.into(),
            op,
            rhs: Operand::Scalar(rhs),
        }
    }

    /// Build an IN-style list comparison
    pub fn within(field: impl Into<FieldPath>, values: Vec<Literal>) -> Self {
        Self {
            field: field.into(),
            op: CompareOp::In,
            rhs: Operand::List(values),
        }
    }
}

/// A boolean predicate tree. Ownership is strictly tree-shaped; AND/OR
/// chains are built left-associatively by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    Comparison(Comparison),
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    /// Conjunction of two conditions
    pub fn and(self, other: Condition) -> Self {
        Condition::And(Box::new(self), Box::new(other))
    }

    /// Disjunction of two conditions
    pub fn or(self, other: Condition) -> Self {
        Condition::Or(Box::new(self), Box::new(other))
    }

    /// Negation
    pub fn negate(self) -> Self {
        Condition::Not(Box::new(self))
    }
}

impl From<Comparison> for Condition {
    fn from(cmp: Comparison) -> Self {
        Condition::Comparison(cmp)
    }
}

/// The aggregation a command performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    /// Value distribution of one field
    Hist,
    /// Line over record order, or pairwise scatter with `VS`
    Plot,
    /// Time trend (monthly buckets) or distinct-value trend, optionally grouped
    Trend,
    /// Value-frequency bars, or a cross-tabulation with `BY`
    Bar,
    /// Summary statistics, optionally grouped
    Stats,
    /// The filtered records themselves
    Identify,
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandKind::Hist => write!(f, "HIST"),
            CommandKind::Plot => write!(f, "PLOT"),
            CommandKind::Trend => write!(f, "TREND"),
            CommandKind::Bar => write!(f, "BAR"),
            CommandKind::Stats => write!(f, "STATS"),
            CommandKind::Identify => write!(f, "IDENTIFY"),
        }
    }
}

/// A parsed query ready for execution
///
/// `secondary` is the `VS` field for Plot and the `BY` grouping field for
/// Trend/Bar/Stats. `field` is absent only for the bare-condition form of
/// IDENTIFY; for the `IDENTIFY field WHERE cond` form it is parsed and
/// retained but not used by evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub kind: CommandKind,
    pub field: Option<FieldPath>,
    pub secondary: Option<FieldPath>,
    pub condition: Option<Condition>,
}

impl Command {
    /// Start building a HIST command
    pub fn hist(field: impl Into<FieldPath>) -> CommandBuilder {
        CommandBuilder::new(CommandKind::Hist, Some(field.into()))
    }

    /// Start building a PLOT command
    pub fn plot(field: impl Into<FieldPath>) -> CommandBuilder {
        CommandBuilder::new(CommandKind::Plot, Some(field.into()))
    }

    /// Start building a TREND command
    pub fn trend(field: impl Into<FieldPath>) -> CommandBuilder {
        CommandBuilder::new(CommandKind::Trend, Some(field.into()))
    }

    /// Start building a BAR command
    pub fn bar(field: impl Into<FieldPath>) -> CommandBuilder {
        CommandBuilder::new(CommandKind::Bar, Some(field.into()))
    }

    /// Start building a STATS command
    pub fn stats(field: impl Into<FieldPath>) -> CommandBuilder {
        CommandBuilder::new(CommandKind::Stats, Some(field.into()))
    }

    /// Build an IDENTIFY command from a condition
    pub fn identify(condition: impl Into<Condition>) -> Command {
        Command {
            kind: CommandKind::Identify,
            field: None,
            secondary: None,
            condition: Some(condition.into()),
        }
    }
}

/// Builder for constructing commands programmatically, structurally
/// identical to what the parser produces for the equivalent query string.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    kind: CommandKind,
    field: Option<FieldPath>,
    secondary: Option<FieldPath>,
    condition: Option<Condition>,
}

impl CommandBuilder {
    fn new(kind: CommandKind, field: Option<FieldPath>) -> Self {
        Self {
            kind,
            field,
            secondary: None,
            condition: None,
        }
    }

    /// Set the y-axis field (PLOT `VS`)
    pub fn vs(mut self, field: impl Into<FieldPath>) -> Self {
        self.secondary = Some(field.into());
        self
    }

    /// Set the grouping field (`BY`)
    pub fn by(mut self, field: impl Into<FieldPath>) -> Self {
        self.secondary = Some(field.into());
        self
    }

    /// Set the WHERE condition
    pub fn filter(mut self, condition: impl Into<Condition>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Build the command
    pub fn build(self) -> Command {
        Command {
            kind: self.kind,
            field: self.field,
            secondary: self.secondary,
            condition: self.condition,
        }
    }
}
