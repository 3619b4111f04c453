//! Read-only summaries computed over a check's view.
//!
//! Every function here takes the view by reference and builds a new, small
//! frame or number from it. None of them allocate anything proportional to
//! the view except the float cast needed for numeric statistics.

use polars::prelude::*;

/// Which occurrences of a repeated row count as duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeep {
    /// Every occurrence after the first
    #[default]
    First,
    /// Every occurrence before the last
    Last,
    /// Every occurrence of a repeated row
    All,
}

pub const STATISTIC_COLUMN: &str = "statistic";

pub fn percentile_label(p: f64) -> String {
    format!("{}%", p * 100.0)
}

/// Distribution summary with one row per statistic and one column per view column.
///
/// Numeric columns get count, null count, mean, standard deviation, min, the
/// requested percentiles and max. Other columns only get the two counts.
pub fn describe(view: &DataFrame, percentiles: &[f64]) -> PolarsResult<DataFrame> {
    let mut labels: Vec<String> = ["count", "null_count", "mean", "std", "min"]
        .iter()
        .map(|s| (*s).to_owned())
        .collect();
    labels.extend(percentiles.iter().map(|p| percentile_label(*p)));
    labels.push("max".to_owned());

    let mut columns = Vec::with_capacity(view.width() + 1);
    columns.push(Column::new(STATISTIC_COLUMN.into(), labels.clone()));

    for col in view.get_columns() {
        let series = col.as_materialized_series();
        let nulls = series.null_count();
        let mut values: Vec<Option<f64>> = vec![
            Some((series.len() - nulls) as f64),
            Some(nulls as f64),
        ];

        if series.dtype().is_primitive_numeric() {
            let cast = series.cast(&DataType::Float64)?;
            let ca = cast.f64()?;
            values.push(ca.mean());
            values.push(ca.std(1));
            values.push(ca.min());
            for p in percentiles {
                values.push(ca.quantile(*p, QuantileMethod::Linear)?);
            }
            values.push(ca.max());
        } else {
            values.resize(labels.len(), None);
        }

        columns.push(Column::new(col.name().clone(), values));
    }

    DataFrame::new(columns)
}

/// Column name to data type.
pub fn dtypes(view: &DataFrame) -> PolarsResult<DataFrame> {
    let names: Vec<String> = view
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    let types: Vec<String> = view.dtypes().iter().map(ToString::to_string).collect();
    DataFrame::new(vec![
        Column::new("column".into(), names),
        Column::new("dtype".into(), types),
    ])
}

/// Estimated bytes held by each column, followed by a `total` row.
pub fn memory_usage(view: &DataFrame) -> PolarsResult<DataFrame> {
    let mut names: Vec<String> = Vec::with_capacity(view.width() + 1);
    let mut bytes: Vec<u64> = Vec::with_capacity(view.width() + 1);
    for col in view.get_columns() {
        names.push(col.name().to_string());
        bytes.push(col.as_materialized_series().estimated_size() as u64);
    }
    names.push("total".to_owned());
    bytes.push(bytes.iter().sum());

    DataFrame::new(vec![
        Column::new("column".into(), names),
        Column::new("bytes".into(), bytes),
    ])
}

/// Shape, per-column non-null counts and dtypes, and the estimated size.
pub fn info(view: &DataFrame) -> PolarsResult<String> {
    let names: Vec<String> = view
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    let non_null: Vec<u64> = view
        .get_columns()
        .iter()
        .map(|c| (c.len() - c.null_count()) as u64)
        .collect();
    let types: Vec<String> = view.dtypes().iter().map(ToString::to_string).collect();
    let table = DataFrame::new(vec![
        Column::new("column".into(), names),
        Column::new("non_null".into(), non_null),
        Column::new("dtype".into(), types),
    ])?;

    Ok(format!(
        "{} rows × {} columns\n{}\nEstimated size: {} bytes",
        view.height(),
        view.width(),
        table,
        view.estimated_size()
    ))
}

/// Null count per column.
pub fn null_counts(view: &DataFrame) -> PolarsResult<DataFrame> {
    let names: Vec<String> = view
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    let counts: Vec<u64> = view
        .get_columns()
        .iter()
        .map(|c| c.null_count() as u64)
        .collect();
    DataFrame::new(vec![
        Column::new("column".into(), names),
        Column::new("nulls".into(), counts),
    ])
}

/// Number of rows with a null in at least one column.
pub fn rows_with_nulls(view: &DataFrame) -> usize {
    let mut mask = BooleanChunked::full("any_null".into(), false, view.height());
    for col in view.get_columns() {
        mask = &mask | &col.is_null();
    }
    mask.into_iter().filter(|v| *v == Some(true)).count()
}

/// Number of duplicated rows under the given keep rule.
pub fn duplicated_rows(view: &DataFrame, keep: DuplicateKeep) -> PolarsResult<usize> {
    if view.width() == 0 {
        return Ok(0);
    }
    match keep {
        // Keeping the first or the last occurrence flags the same number of rows.
        DuplicateKeep::First | DuplicateKeep::Last => {
            let unique = view.unique_stable(None, UniqueKeepStrategy::First, None)?;
            Ok(view.height() - unique.height())
        }
        DuplicateKeep::All => Ok(view
            .is_duplicated()?
            .into_iter()
            .filter(|v| *v == Some(true))
            .count()),
    }
}

/// Frequencies of each value in `column`, most frequent first.
pub fn value_counts(view: &DataFrame, column: &str, max_rows: usize) -> PolarsResult<DataFrame> {
    let counts = view
        .column(column)?
        .as_materialized_series()
        .value_counts(true, false, "count".into(), false)?;
    Ok(if max_rows > 0 {
        counts.head(Some(max_rows))
    } else {
        counts
    })
}

/// Distinct values of `column` in first-seen order.
pub fn unique_values(view: &DataFrame, column: &str) -> PolarsResult<Series> {
    view.column(column)?.as_materialized_series().unique_stable()
}

pub fn n_unique(view: &DataFrame, column: &str) -> PolarsResult<usize> {
    view.column(column)?.as_materialized_series().n_unique()
}
