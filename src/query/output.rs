//! Query result payloads
//!
//! `Output` mirrors the command variants one-to-one. The core hands these
//! typed values to a renderer and performs no formatting or I/O itself.
//! Every payload degrades gracefully to empty when no records match.

use crate::data::{Record, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The typed result of executing one command against a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Output {
    Hist(HistOutput),
    Plot(PlotOutput),
    Trend(TrendOutput),
    Bar(BarOutput),
    Stats(StatsOutput),
    Identify(IdentifyOutput),
}

/// Value distribution of one field over the filtered subset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistOutput {
    pub field: String,
    /// Non-null resolved values in dataset order
    pub values: Vec<Value>,
    pub count: usize,
    /// Present only when every value is numeric; categorical values are
    /// bucketed by the renderer instead
    pub stats: Option<NumericSummary>,
}

/// Line-over-order or pairwise scatter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum PlotOutput {
    /// No VS field: values in record order against an implicit 0..n index
    Line {
        field: String,
        x: Vec<usize>,
        y: Vec<Value>,
        count: usize,
    },
    /// VS field: records where either side is null are dropped pairwise
    Scatter {
        x_field: String,
        y_field: String,
        x: Vec<Value>,
        y: Vec<Value>,
        /// Identifier column values carried through for point identification;
        /// empty when the dataset names no id field
        record_ids: Vec<Value>,
        count: usize,
    },
}

/// One bucketed trend series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "bucketing", rename_all = "lowercase")]
pub enum TrendSeries {
    /// Timestamp field bucketed by calendar month, ascending
    Monthly {
        periods: Vec<String>,
        counts: Vec<usize>,
    },
    /// Any other field bucketed by distinct value, ascending
    Discrete {
        values: Vec<Value>,
        counts: Vec<usize>,
    },
}

/// Time-trend result, optionally split per group value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendOutput {
    pub field: String,
    pub group_by: Option<String>,
    pub data: TrendData,
    pub total_count: usize,
}

/// Ungrouped or grouped trend payload. Groups that end up empty after
/// null-filtering the trend field are omitted entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrendData {
    Single(TrendSeries),
    Grouped(BTreeMap<String, TrendSeries>),
}

/// Value-frequency bars or a cross-tabulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum BarOutput {
    /// Categories ordered by descending count, ties by first encounter
    Flat {
        field: String,
        categories: Vec<Value>,
        counts: Vec<usize>,
        total_count: usize,
    },
    /// `matrix[i][j]` counts records with the i-th category and j-th group
    /// value; unseen combinations are 0, not omitted. Category and group
    /// order is first encounter in dataset order.
    Grouped {
        field: String,
        group_by: String,
        categories: Vec<Value>,
        groups: Vec<Value>,
        matrix: Vec<Vec<usize>>,
        total_count: usize,
    },
}

/// Summary statistics, optionally per group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsOutput {
    pub field: String,
    pub group_by: Option<String>,
    pub data: StatsData,
    pub total_count: usize,
}

/// Ungrouped or grouped stats payload. A group appears only if it has at
/// least one non-null value for the target field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatsData {
    Single(FieldSummary),
    Grouped(BTreeMap<String, FieldSummary>),
}

/// Summary of one field's filtered values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FieldSummary {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
}

/// Statistics over numeric values. All fields are None at count zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// Sample (n-1) standard deviation; None below two values
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub distinct: usize,
}

impl NumericSummary {
    /// Summarize a slice of numeric values
    pub fn compute(values: &[f64]) -> Self {
        let count = values.len();
        if count == 0 {
            return Self {
                count: 0,
                mean: None,
                median: None,
                std: None,
                min: None,
                max: None,
                distinct: 0,
            };
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mean = sorted.iter().sum::<f64>() / count as f64;

        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };

        let std = if count > 1 {
            let variance = sorted
                .iter()
                .map(|x| (x - mean).powi(2))
                .sum::<f64>()
                / (count - 1) as f64;
            Some(variance.sqrt())
        } else {
            None
        };

        let mut distinct = 1;
        for pair in sorted.windows(2) {
            if pair[0] != pair[1] {
                distinct += 1;
            }
        }

        Self {
            count,
            mean: Some(mean),
            median: Some(median),
            std,
            min: Some(sorted[0]),
            max: Some(sorted[count - 1]),
            distinct,
        }
    }
}

/// Statistics over non-numeric values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSummary {
    pub count: usize,
    pub distinct: usize,
    /// Most frequent value, ties broken by first encounter in dataset order
    pub top: Option<Value>,
    /// The ten most frequent values with their counts, descending
    pub top_values: Vec<(Value, usize)>,
}

/// The filtered records themselves, for downstream display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifyOutput {
    pub records: Vec<Record>,
    pub count: usize,
    pub total_count: usize,
}
