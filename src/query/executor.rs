//! Aggregation Engine
//!
//! Executes a Command against a Dataset:
//! 1. Evaluate the WHERE condition (if any) into a selection mask
//! 2. Dispatch on the command kind over the selected subset
//! 3. Produce the matching typed Output
//!
//! # Execution Pipeline
//!
//! ```text
//! Command → Mask → Filter → Aggregate → Output
//! ```
//!
//! Everything here is synchronous and side-effect-free; the dataset is
//! borrowed read-only for the duration of one call.

use crate::data::{Dataset, FieldKind, Record, Value, ValueKey};
use crate::query::ast::{Command, CommandKind, FieldPath};
use crate::query::error::{QueryError, QueryResult};
use crate::query::eval;
use crate::query::output::*;
use crate::query::resolve;
use chrono::Datelike;
use std::collections::BTreeMap;
use std::time::Instant;

/// Query executor bound to one dataset
pub struct Executor<'a> {
    dataset: &'a Dataset,
}

impl<'a> Executor<'a> {
    /// Create an executor borrowing the dataset read-only
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// Parse and execute a query string
    pub fn execute_str(&self, query: &str) -> QueryResult<Output> {
        let command = crate::query::parser::parse(query)?;
        self.execute(&command)
    }

    /// Execute a parsed command
    pub fn execute(&self, command: &Command) -> QueryResult<Output> {
        let start = Instant::now();

        let subset: Vec<&Record> = match &command.condition {
            Some(condition) => {
                let mask = eval::evaluate(self.dataset, condition)?;
                self.dataset
                    .records()
                    .iter()
                    .zip(mask)
                    .filter(|(_, selected)| *selected)
                    .map(|(record, _)| record)
                    .collect()
            }
            None => self.dataset.records().iter().collect(),
        };

        let matched = subset.len();

        let output = match command.kind {
            CommandKind::Hist => self.hist(&subset, command)?,
            CommandKind::Plot => self.plot(&subset, command)?,
            CommandKind::Trend => self.trend(&subset, command)?,
            CommandKind::Bar => self.bar(&subset, command)?,
            CommandKind::Stats => self.stats(&subset, command)?,
            CommandKind::Identify => Output::Identify(IdentifyOutput {
                count: subset.len(),
                total_count: subset.len(),
                records: subset.into_iter().cloned().collect(),
            }),
        };

        tracing::debug!(
            "executed {} over {} of {} records in {}ms",
            command.kind,
            matched,
            self.dataset.len(),
            start.elapsed().as_millis()
        );

        Ok(output)
    }

    /// Resolve the target field over a subset, keeping nulls
    fn resolve_all(&self, subset: &[&Record], field: &FieldPath) -> QueryResult<Vec<Value>> {
        resolve::check_path(self.dataset.schema(), field)?;
        Ok(subset
            .iter()
            .map(|record| resolve::resolve(record, field, self.dataset.schema()))
            .collect())
    }

    fn target_field<'c>(&self, command: &'c Command) -> QueryResult<&'c FieldPath> {
        command.field.as_ref().ok_or_else(|| {
            QueryError::Execution(format!("{} requires a target field", command.kind))
        })
    }

    fn hist(&self, subset: &[&Record], command: &Command) -> QueryResult<Output> {
        let field = self.target_field(command)?;
        let values: Vec<Value> = self
            .resolve_all(subset, field)?
            .into_iter()
            .filter(|v| !v.is_null())
            .collect();

        let stats = if !values.is_empty() && values.iter().all(Value::is_numeric) {
            let nums: Vec<f64> = values.iter().filter_map(Value::as_f64).collect();
            Some(NumericSummary::compute(&nums))
        } else {
            None
        };

        Ok(Output::Hist(HistOutput {
            field: field.to_string(),
            count: values.len(),
            values,
            stats,
        }))
    }

    fn plot(&self, subset: &[&Record], command: &Command) -> QueryResult<Output> {
        let field = self.target_field(command)?;

        let Some(y_field) = &command.secondary else {
            // implicit line over record order; nulls stay as gaps
            let y = self.resolve_all(subset, field)?;
            return Ok(Output::Plot(PlotOutput::Line {
                field: field.to_string(),
                x: (0..y.len()).collect(),
                count: y.len(),
                y,
            }));
        };

        let xs = self.resolve_all(subset, field)?;
        let ys = self.resolve_all(subset, y_field)?;

        // pairwise null drop: a record survives only with both sides present
        let id_path = self
            .dataset
            .id_field_name()
            .filter(|name| self.dataset.schema().contains(name))
            .map(FieldPath::from);

        let mut x = Vec::new();
        let mut y = Vec::new();
        let mut record_ids = Vec::new();

        for ((xv, yv), record) in xs.into_iter().zip(ys).zip(subset) {
            if xv.is_null() || yv.is_null() {
                continue;
            }
            if let Some(id_path) = &id_path {
                record_ids.push(resolve::resolve(record, id_path, self.dataset.schema()));
            }
            x.push(xv);
            y.push(yv);
        }

        Ok(Output::Plot(PlotOutput::Scatter {
            x_field: field.to_string(),
            y_field: y_field.to_string(),
            count: x.len(),
            x,
            y,
            record_ids,
        }))
    }

    fn trend(&self, subset: &[&Record], command: &Command) -> QueryResult<Output> {
        let field = self.target_field(command)?;
        let monthly = resolve::leaf_kind(self.dataset, field) == FieldKind::Timestamp;

        let data = match &command.secondary {
            None => {
                let values: Vec<Value> = self
                    .resolve_all(subset, field)?
                    .into_iter()
                    .filter(|v| !v.is_null())
                    .collect();
                TrendData::Single(bucket_series(values, monthly))
            }
            Some(group_field) => {
                let group_values = self.resolve_all(subset, group_field)?;
                let target_values = self.resolve_all(subset, field)?;

                let mut grouped: BTreeMap<String, Vec<Value>> = BTreeMap::new();
                for (group, value) in group_values.into_iter().zip(target_values) {
                    if group.is_null() || value.is_null() {
                        continue;
                    }
                    grouped.entry(group.to_string()).or_default().push(value);
                }

                // empty groups are already absent: only non-null pairs land here
                TrendData::Grouped(
                    grouped
                        .into_iter()
                        .map(|(label, values)| (label, bucket_series(values, monthly)))
                        .collect(),
                )
            }
        };

        Ok(Output::Trend(TrendOutput {
            field: field.to_string(),
            group_by: command.secondary.as_ref().map(|f| f.to_string()),
            data,
            total_count: subset.len(),
        }))
    }

    fn bar(&self, subset: &[&Record], command: &Command) -> QueryResult<Output> {
        let field = self.target_field(command)?;
        let values = self.resolve_all(subset, field)?;

        let output = match &command.secondary {
            None => {
                let mut counter = ValueCounter::new();
                for value in values {
                    if !value.is_null() {
                        counter.add(value);
                    }
                }
                let (categories, counts) = counter.by_count_desc();
                Output::Bar(BarOutput::Flat {
                    field: field.to_string(),
                    categories,
                    counts,
                    total_count: subset.len(),
                })
            }
            Some(group_field) => {
                let group_values = self.resolve_all(subset, group_field)?;

                let mut categories = ValueCounter::new();
                let mut groups = ValueCounter::new();
                let mut cells: BTreeMap<(usize, usize), usize> = BTreeMap::new();

                for (value, group) in values.into_iter().zip(group_values) {
                    if value.is_null() || group.is_null() {
                        continue;
                    }
                    let ci = categories.add(value);
                    let gi = groups.add(group);
                    *cells.entry((ci, gi)).or_insert(0) += 1;
                }

                let categories = categories.into_values();
                let groups = groups.into_values();

                let mut matrix = vec![vec![0usize; groups.len()]; categories.len()];
                for ((ci, gi), count) in cells {
                    matrix[ci][gi] = count;
                }

                Output::Bar(BarOutput::Grouped {
                    field: field.to_string(),
                    group_by: group_field.to_string(),
                    categories,
                    groups,
                    matrix,
                    total_count: subset.len(),
                })
            }
        };

        Ok(output)
    }

    fn stats(&self, subset: &[&Record], command: &Command) -> QueryResult<Output> {
        let field = self.target_field(command)?;
        let values = self.resolve_all(subset, field)?;

        let data = match &command.secondary {
            None => {
                let clean: Vec<Value> = values.into_iter().filter(|v| !v.is_null()).collect();
                StatsData::Single(summarize(clean))
            }
            Some(group_field) => {
                let group_values = self.resolve_all(subset, group_field)?;

                let mut grouped: BTreeMap<String, Vec<Value>> = BTreeMap::new();
                for (group, value) in group_values.into_iter().zip(values) {
                    // a group needs at least one non-null target value to appear
                    if group.is_null() || value.is_null() {
                        continue;
                    }
                    grouped.entry(group.to_string()).or_default().push(value);
                }

                StatsData::Grouped(
                    grouped
                        .into_iter()
                        .map(|(label, values)| (label, summarize(values)))
                        .collect(),
                )
            }
        };

        Ok(Output::Stats(StatsOutput {
            field: field.to_string(),
            group_by: command.secondary.as_ref().map(|f| f.to_string()),
            data,
            total_count: subset.len(),
        }))
    }
}

/// Bucket non-null trend values: by calendar month for timestamp fields,
/// by distinct value (ascending) otherwise.
fn bucket_series(values: Vec<Value>, monthly: bool) -> TrendSeries {
    if monthly {
        let mut buckets: BTreeMap<(i32, u32), usize> = BTreeMap::new();
        for value in values {
            if let Value::Timestamp(ts) = value {
                *buckets.entry((ts.year(), ts.month())).or_insert(0) += 1;
            }
        }
        let (periods, counts) = buckets
            .into_iter()
            .map(|((year, month), count)| (format!("{:04}-{:02}", year, month), count))
            .unzip();
        TrendSeries::Monthly { periods, counts }
    } else {
        let mut counter = ValueCounter::new();
        for value in values {
            counter.add(value);
        }
        let (values, counts) = counter.ascending();
        TrendSeries::Discrete { values, counts }
    }
}

/// Summarize non-null values: numeric stats when every value is numeric,
/// categorical top-values otherwise. Empty input degrades to an all-None
/// numeric summary.
fn summarize(values: Vec<Value>) -> FieldSummary {
    if values.iter().all(Value::is_numeric) {
        let nums: Vec<f64> = values.iter().filter_map(Value::as_f64).collect();
        return FieldSummary::Numeric(NumericSummary::compute(&nums));
    }

    let count = values.len();
    let mut counter = ValueCounter::new();
    for value in values {
        counter.add(value);
    }

    FieldSummary::Categorical(CategoricalSummary {
        count,
        distinct: counter.len(),
        top: counter.mode(),
        top_values: counter.top_n(10),
    })
}

/// Counts distinct values while remembering first-encounter order.
struct ValueCounter {
    index: BTreeMap<ValueKey, usize>,
    entries: Vec<(Value, usize)>,
}

impl ValueCounter {
    fn new() -> Self {
        Self {
            index: BTreeMap::new(),
            entries: Vec::new(),
        }
    }

    /// Count one value, returning its first-encounter index
    fn add(&mut self, value: Value) -> usize {
        match self.index.get(&ValueKey(value.clone())) {
            Some(&i) => {
                self.entries[i].1 += 1;
                i
            }
            None => {
                let i = self.entries.len();
                self.index.insert(ValueKey(value.clone()), i);
                self.entries.push((value, 1));
                i
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    /// Distinct values in first-encounter order
    fn into_values(self) -> Vec<Value> {
        self.entries.into_iter().map(|(v, _)| v).collect()
    }

    /// Values and counts sorted ascending by value
    fn ascending(mut self) -> (Vec<Value>, Vec<usize>) {
        self.entries
            .sort_by(|(a, _), (b, _)| a.total_cmp(b));
        self.entries.into_iter().unzip()
    }

    /// Values and counts sorted by descending count; a stable sort keeps
    /// first-encounter order among ties
    fn by_count_desc(mut self) -> (Vec<Value>, Vec<usize>) {
        self.entries.sort_by(|(_, a), (_, b)| b.cmp(a));
        self.entries.into_iter().unzip()
    }

    /// Most frequent value, first encounter winning ties
    fn mode(&self) -> Option<Value> {
        let mut best: Option<&(Value, usize)> = None;
        for entry in &self.entries {
            if best.map(|(_, count)| entry.1 > *count).unwrap_or(true) {
                best = Some(entry);
            }
        }
        best.map(|(value, _)| value.clone())
    }

    /// The n most frequent values with counts, descending
    fn top_n(self, n: usize) -> Vec<(Value, usize)> {
        let (values, counts) = self.by_count_desc();
        values.into_iter().zip(counts).take(n).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Record;
    use chrono::{TimeZone, Utc};

    fn pr(number: i64, state: &str, comments: i64) -> Record {
        Record::new()
            .field("number", number)
            .field("state", state)
            .field("comments", comments)
    }

    fn sample_dataset() -> Dataset {
        Dataset::new(vec![
            pr(1, "open", 3),
            pr(2, "closed", 10),
            pr(3, "open", 7),
        ])
        .id_field("number")
    }

    #[test]
    fn test_hist_numeric() {
        let data = sample_dataset();
        let output = Executor::new(&data).execute_str("HIST comments").unwrap();

        match output {
            Output::Hist(hist) => {
                assert_eq!(hist.count, 3);
                assert_eq!(
                    hist.values,
                    vec![Value::Int(3), Value::Int(10), Value::Int(7)]
                );
                let stats = hist.stats.unwrap();
                assert_eq!(stats.mean, Some(20.0 / 3.0));
                assert_eq!(stats.distinct, 3);
            }
            other => panic!("expected Hist, got {:?}", other),
        }
    }

    #[test]
    fn test_hist_categorical_has_no_stats() {
        let data = sample_dataset();
        let output = Executor::new(&data).execute_str("HIST state").unwrap();

        match output {
            Output::Hist(hist) => {
                assert_eq!(hist.count, 3);
                assert!(hist.stats.is_none());
            }
            other => panic!("expected Hist, got {:?}", other),
        }
    }

    #[test]
    fn test_hist_with_filter() {
        let data = sample_dataset();
        let output = Executor::new(&data)
            .execute_str("HIST comments WHERE state = 'open'")
            .unwrap();

        match output {
            Output::Hist(hist) => {
                assert_eq!(hist.values, vec![Value::Int(3), Value::Int(7)]);
            }
            other => panic!("expected Hist, got {:?}", other),
        }
    }

    #[test]
    fn test_plot_line_over_order() {
        let data = sample_dataset();
        let output = Executor::new(&data).execute_str("PLOT comments").unwrap();

        match output {
            Output::Plot(PlotOutput::Line { x, y, count, .. }) => {
                assert_eq!(x, vec![0, 1, 2]);
                assert_eq!(y.len(), 3);
                assert_eq!(count, 3);
            }
            other => panic!("expected Line, got {:?}", other),
        }
    }

    #[test]
    fn test_plot_scatter_pairwise_null_drop() {
        let data = Dataset::new(vec![
            Record::new().field("number", 1).field("a", 1).field("b", 10),
            Record::new().field("number", 2).field("a", 2),
            Record::new().field("number", 3).field("b", 30),
            Record::new().field("number", 4).field("a", 4).field("b", 40),
        ])
        .id_field("number");

        let output = Executor::new(&data).execute_str("PLOT a VS b").unwrap();

        match output {
            Output::Plot(PlotOutput::Scatter {
                x, y, record_ids, count, ..
            }) => {
                assert_eq!(x, vec![Value::Int(1), Value::Int(4)]);
                assert_eq!(y, vec![Value::Int(10), Value::Int(40)]);
                assert_eq!(record_ids, vec![Value::Int(1), Value::Int(4)]);
                assert_eq!(count, 2);
            }
            other => panic!("expected Scatter, got {:?}", other),
        }
    }

    #[test]
    fn test_trend_monthly_buckets() {
        let ts = |y, m, d| Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap();
        let data = Dataset::new(vec![
            Record::new().field("created_at", ts(2024, 1, 5)),
            Record::new().field("created_at", ts(2024, 1, 20)),
            Record::new().field("created_at", ts(2024, 3, 1)),
            Record::new().field("created_at", Value::Null),
        ]);

        let output = Executor::new(&data).execute_str("TREND created_at").unwrap();

        match output {
            Output::Trend(trend) => match trend.data {
                TrendData::Single(TrendSeries::Monthly { periods, counts }) => {
                    assert_eq!(periods, vec!["2024-01", "2024-03"]);
                    assert_eq!(counts, vec![2, 1]);
                }
                other => panic!("expected Monthly, got {:?}", other),
            },
            other => panic!("expected Trend, got {:?}", other),
        }
    }

    #[test]
    fn test_trend_discrete_sorted_ascending() {
        let data = Dataset::new(vec![
            Record::new().field("week", 3),
            Record::new().field("week", 1),
            Record::new().field("week", 3),
        ]);

        let output = Executor::new(&data).execute_str("TREND week").unwrap();

        match output {
            Output::Trend(trend) => match trend.data {
                TrendData::Single(TrendSeries::Discrete { values, counts }) => {
                    assert_eq!(values, vec![Value::Int(1), Value::Int(3)]);
                    assert_eq!(counts, vec![1, 2]);
                }
                other => panic!("expected Discrete, got {:?}", other),
            },
            other => panic!("expected Trend, got {:?}", other),
        }
    }

    #[test]
    fn test_trend_grouped_omits_empty_groups() {
        let ts = |y, m| Utc.with_ymd_and_hms(y, m, 1, 0, 0, 0).unwrap();
        let data = Dataset::new(vec![
            Record::new().field("created_at", ts(2024, 1)).field("label", "bug"),
            Record::new().field("created_at", ts(2024, 2)).field("label", "bug"),
            // this group's only record has a null time field
            Record::new().field("created_at", Value::Null).field("label", "feature"),
        ]);

        let output = Executor::new(&data)
            .execute_str("TREND created_at BY label")
            .unwrap();

        match output {
            Output::Trend(trend) => match trend.data {
                TrendData::Grouped(groups) => {
                    assert!(groups.contains_key("bug"));
                    assert!(!groups.contains_key("feature"));
                }
                other => panic!("expected Grouped, got {:?}", other),
            },
            other => panic!("expected Trend, got {:?}", other),
        }
    }

    #[test]
    fn test_bar_flat_ordered_by_count() {
        let data = Dataset::new(vec![
            Record::new().field("label", "a"),
            Record::new().field("label", "b"),
            Record::new().field("label", "b"),
            Record::new().field("label", "c"),
        ]);

        let output = Executor::new(&data).execute_str("BAR label").unwrap();

        match output {
            Output::Bar(BarOutput::Flat {
                categories, counts, total_count, ..
            }) => {
                assert_eq!(categories[0], Value::String("b".into()));
                assert_eq!(counts, vec![2, 1, 1]);
                // tie between a and c broken by first encounter
                assert_eq!(categories[1], Value::String("a".into()));
                assert_eq!(total_count, 4);
            }
            other => panic!("expected Flat, got {:?}", other),
        }
    }

    #[test]
    fn test_bar_crosstab_scenario() {
        let data = Dataset::new(vec![
            Record::new().field("label", "A").field("state", "open"),
            Record::new().field("label", "A").field("state", "closed"),
            Record::new().field("label", "B").field("state", "open"),
        ]);

        let output = Executor::new(&data).execute_str("BAR label BY state").unwrap();

        match output {
            Output::Bar(BarOutput::Grouped {
                categories, groups, matrix, ..
            }) => {
                assert_eq!(
                    categories,
                    vec![Value::String("A".into()), Value::String("B".into())]
                );
                assert_eq!(
                    groups,
                    vec![Value::String("open".into()), Value::String("closed".into())]
                );
                assert_eq!(matrix, vec![vec![1, 1], vec![1, 0]]);
            }
            other => panic!("expected Grouped, got {:?}", other),
        }
    }

    #[test]
    fn test_stats_grouped_scenario() {
        let data = sample_dataset();
        let output = Executor::new(&data)
            .execute_str("STATS comments BY state")
            .unwrap();

        match output {
            Output::Stats(stats) => match stats.data {
                StatsData::Grouped(groups) => {
                    let open = match &groups["open"] {
                        FieldSummary::Numeric(s) => s,
                        other => panic!("expected Numeric, got {:?}", other),
                    };
                    assert_eq!(open.count, 2);
                    assert_eq!(open.mean, Some(5.0));
                    assert_eq!(open.min, Some(3.0));
                    assert_eq!(open.max, Some(7.0));

                    let closed = match &groups["closed"] {
                        FieldSummary::Numeric(s) => s,
                        other => panic!("expected Numeric, got {:?}", other),
                    };
                    assert_eq!(closed.count, 1);
                    assert_eq!(closed.mean, Some(10.0));
                }
                other => panic!("expected Grouped, got {:?}", other),
            },
            other => panic!("expected Stats, got {:?}", other),
        }
    }

    #[test]
    fn test_stats_categorical() {
        let data = Dataset::new(vec![
            Record::new().field("label", "bug"),
            Record::new().field("label", "bug"),
            Record::new().field("label", "feature"),
        ]);

        let output = Executor::new(&data).execute_str("STATS label").unwrap();

        match output {
            Output::Stats(stats) => match stats.data {
                StatsData::Single(FieldSummary::Categorical(summary)) => {
                    assert_eq!(summary.count, 3);
                    assert_eq!(summary.distinct, 2);
                    assert_eq!(summary.top, Some(Value::String("bug".into())));
                    assert_eq!(summary.top_values[0], (Value::String("bug".into()), 2));
                }
                other => panic!("expected Categorical, got {:?}", other),
            },
            other => panic!("expected Stats, got {:?}", other),
        }
    }

    #[test]
    fn test_stats_grouped_requires_non_null_target() {
        let data = Dataset::new(vec![
            Record::new().field("state", "open").field("comments", 3),
            Record::new().field("state", "abandoned").field("comments", Value::Null),
        ]);

        let output = Executor::new(&data)
            .execute_str("STATS comments BY state")
            .unwrap();

        match output {
            Output::Stats(stats) => match stats.data {
                StatsData::Grouped(groups) => {
                    assert!(groups.contains_key("open"));
                    assert!(!groups.contains_key("abandoned"));
                }
                other => panic!("expected Grouped, got {:?}", other),
            },
            other => panic!("expected Stats, got {:?}", other),
        }
    }

    #[test]
    fn test_identify_returns_filtered_records() {
        let data = sample_dataset();
        let output = Executor::new(&data)
            .execute_str("IDENTIFY state = 'open' AND comments > 5")
            .unwrap();

        match output {
            Output::Identify(result) => {
                assert_eq!(result.count, 1);
                assert_eq!(result.records[0].get("number"), Some(&Value::Int(3)));
            }
            other => panic!("expected Identify, got {:?}", other),
        }
    }

    #[test]
    fn test_identify_field_where_form_ignores_field() {
        let data = sample_dataset();
        let executor = Executor::new(&data);

        let with_field = executor
            .execute_str("IDENTIFY comments WHERE comments > 5")
            .unwrap();
        let bare = executor.execute_str("IDENTIFY comments > 5").unwrap();

        assert_eq!(with_field, bare);
    }

    #[test]
    fn test_zero_matches_is_not_an_error() {
        let data = sample_dataset();
        let executor = Executor::new(&data);

        match executor.execute_str("HIST comments WHERE comments > 999").unwrap() {
            Output::Hist(hist) => {
                assert_eq!(hist.count, 0);
                assert!(hist.stats.is_none());
            }
            other => panic!("expected Hist, got {:?}", other),
        }

        match executor.execute_str("STATS comments WHERE comments > 999").unwrap() {
            Output::Stats(stats) => match stats.data {
                StatsData::Single(FieldSummary::Numeric(summary)) => {
                    assert_eq!(summary.count, 0);
                    assert_eq!(summary.mean, None);
                }
                other => panic!("expected empty Numeric, got {:?}", other),
            },
            other => panic!("expected Stats, got {:?}", other),
        }

        match executor.execute_str("TREND comments WHERE comments > 999").unwrap() {
            Output::Trend(trend) => match trend.data {
                TrendData::Single(TrendSeries::Discrete { values, counts }) => {
                    assert!(values.is_empty());
                    assert!(counts.is_empty());
                }
                other => panic!("expected empty Discrete, got {:?}", other),
            },
            other => panic!("expected Trend, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_field_scenario() {
        let data = Dataset::from_json(
            r#"[
                {"number": 1, "labels_assigned": [{"label": "x", "confidence": 0.9}]},
                {"number": 2, "labels_assigned": []}
            ]"#,
        )
        .unwrap();

        let output = Executor::new(&data)
            .execute_str("BAR labels_assigned.label")
            .unwrap();

        match output {
            Output::Bar(BarOutput::Flat { categories, counts, .. }) => {
                assert_eq!(categories, vec![Value::String("x".into())]);
                assert_eq!(counts, vec![1]);
            }
            other => panic!("expected Flat, got {:?}", other),
        }
    }

    #[test]
    fn test_builder_and_parser_agree() {
        use crate::query::ast::{Command, CompareOp, Comparison, Literal};

        let data = sample_dataset();
        let executor = Executor::new(&data);

        let built = Command::stats("comments")
            .by("state")
            .filter(Comparison::new(
                "comments",
                CompareOp::Gt,
                Literal::Int(2),
            ))
            .build();

        let parsed = executor
            .execute_str("STATS comments BY state WHERE comments > 2")
            .unwrap();

        assert_eq!(executor.execute(&built).unwrap(), parsed);
    }
}
