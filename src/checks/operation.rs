//! The catalog of inspection operations.
//!
//! Every descriptive or plotting check is one [`Operation`] variant. The
//! executor treats them uniformly: it derives the view, then calls
//! [`Operation::execute`], which maps the variant to the table engine primitive
//! it wraps and sends the result to the output surface or plot backend.

use super::Context;
use super::render::Rendered;
use super::stats::{self, DuplicateKeep};
use crate::error::{CheckError, Result};
use crate::plot::PlotRequest;
use polars::prelude::*;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct DescribeOptions {
    /// Quantiles in `[0, 1]` reported between min and max
    pub percentiles: Vec<f64>,
}

impl Default for DescribeOptions {
    fn default() -> Self {
        Self {
            percentiles: vec![0.25, 0.5, 0.75],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullOptions {
    /// Count nulls per column (true) or rows with any null (false)
    pub by_column: bool,
}

impl Default for NullOptions {
    fn default() -> Self {
        Self { by_column: true }
    }
}

pub const DEFAULT_ROWS: usize = 5;
pub const DEFAULT_MAX_ROWS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Describe(DescribeOptions),
    Columns,
    Dtypes,
    Head(usize),
    Tail(usize),
    Info,
    MemoryUsage,
    NCols,
    NRows,
    Shape,
    NDups(DuplicateKeep),
    NNulls(NullOptions),
    NUnique(String),
    Unique(String),
    ValueCounts { column: String, max_rows: usize },
    Print { text: Option<String>, max_rows: usize },
    Hist(PlotRequest),
    Plot(PlotRequest),
}

impl Operation {
    pub const IDENTIFIERS: [&'static str; 18] = [
        "describe",
        "columns",
        "dtypes",
        "head",
        "tail",
        "info",
        "memory_usage",
        "ncols",
        "nrows",
        "shape",
        "ndups",
        "nnulls",
        "nunique",
        "unique",
        "value_counts",
        "print",
        "hist",
        "plot",
    ];

    pub fn identifier(&self) -> &'static str {
        match self {
            Self::Describe(_) => "describe",
            Self::Columns => "columns",
            Self::Dtypes => "dtypes",
            Self::Head(_) => "head",
            Self::Tail(_) => "tail",
            Self::Info => "info",
            Self::MemoryUsage => "memory_usage",
            Self::NCols => "ncols",
            Self::NRows => "nrows",
            Self::Shape => "shape",
            Self::NDups(_) => "ndups",
            Self::NNulls(_) => "nnulls",
            Self::NUnique(_) => "nunique",
            Self::Unique(_) => "unique",
            Self::ValueCounts { .. } => "value_counts",
            Self::Print { .. } => "print",
            Self::Hist(_) => "hist",
            Self::Plot(_) => "plot",
        }
    }

    /// Column that scopes a single-column operation.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::NUnique(c) | Self::Unique(c) | Self::ValueCounts { column: c, .. } => Some(c),
            _ => None,
        }
    }

    /// Label shown when the caller gives none.
    pub fn default_label(&self, subset: Option<&[PlSmallStr]>) -> Option<String> {
        let scope = subset.map(|cols| {
            format!(
                "[{}]",
                cols.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(", ")
            )
        });
        let label = match self {
            Self::Describe(_) => "📏 Distributions".to_owned(),
            Self::Columns | Self::NCols => "🏛️ Columns".to_owned(),
            Self::Dtypes => "🗂️ Data types".to_owned(),
            Self::Head(n) => format!("⬆️ First {n} rows"),
            Self::Tail(n) => format!("⬇️ Last {n} rows"),
            Self::Info => "ℹ️ Info".to_owned(),
            Self::MemoryUsage => "💾 Memory usage".to_owned(),
            Self::NRows => "☰ Rows".to_owned(),
            Self::Shape => "📐 Shape".to_owned(),
            Self::NDups(_) => match scope {
                Some(scope) => format!("👯 Rows with duplication in {scope}"),
                None => "👯 Duplicated rows".to_owned(),
            },
            Self::NNulls(_) => match scope {
                Some(scope) => format!("👻 Rows with nulls in {scope}"),
                None => "👻 Rows with nulls".to_owned(),
            },
            Self::NUnique(c) => format!("🌟 Unique values in {c}"),
            Self::Unique(c) => format!("🌟 Unique values of {c}"),
            Self::ValueCounts { max_rows, .. } if *max_rows > 0 => {
                format!("🧮 Value counts, first {max_rows} values")
            }
            Self::ValueCounts { .. } => "🧮 Value counts".to_owned(),
            Self::Hist(_) if subset.is_some_and(|s| s.len() == 1) => "Distribution".to_owned(),
            Self::Hist(_) => "Distributions".to_owned(),
            Self::Print { .. } | Self::Plot(_) => return None,
        };
        Some(label)
    }

    /// Runs the operation against the context's view.
    ///
    /// # Errors
    ///
    /// Polars errors from the wrapped primitive, plot backend or surface failures.
    pub(crate) fn execute(&self, ctx: &Context<'_>) -> Result<()> {
        let label = ctx.label_or(self.default_label(ctx.subset));
        let label = label.as_deref();
        let view = &ctx.view;

        let rendered: Rendered = match self {
            Self::Describe(options) => stats::describe(view, &options.percentiles)?.into(),
            Self::Columns => Rendered::List(
                view.get_column_names()
                    .iter()
                    .map(|n| n.to_string())
                    .collect(),
            ),
            Self::Dtypes => stats::dtypes(view)?.into(),
            Self::Head(n) => view.head(Some(*n)).into(),
            Self::Tail(n) => view.tail(Some(*n)).into(),
            Self::Info => stats::info(view)?.into(),
            Self::MemoryUsage => stats::memory_usage(view)?.into(),
            Self::NCols => view.width().into(),
            Self::NRows => view.height().into(),
            Self::Shape => format!("({}, {})", view.height(), view.width()).into(),
            Self::NDups(keep) => stats::duplicated_rows(view, *keep)?.into(),
            Self::NNulls(options) if options.by_column => stats::null_counts(view)?.into(),
            Self::NNulls(_) => format!(
                "{} out of {}",
                stats::rows_with_nulls(view),
                view.height()
            )
            .into(),
            Self::NUnique(column) => stats::n_unique(view, column)?.into(),
            Self::Unique(column) => stats::unique_values(view, column)?.into(),
            Self::ValueCounts { column, max_rows } => {
                stats::value_counts(view, column, *max_rows)?.into()
            }
            Self::Print {
                text: Some(text), ..
            } => text.as_str().into(),
            Self::Print {
                text: None,
                max_rows,
            } => view.head(Some(*max_rows)).into(),
            Self::Hist(request) | Self::Plot(request) => {
                let mut request = request.clone();
                request.title = match request.title.take() {
                    Some(title) => Some(ctx.decorate(&title)),
                    None => label.map(str::to_owned),
                };
                request.precision.get_or_insert(ctx.settings.precision);
                return ctx.plotter.render(view, &request, ctx.surface);
            }
        };

        ctx.emit(label, &rendered)
    }
}

impl FromStr for Operation {
    type Err = CheckError;

    /// Parses `name` or `name:argument`, e.g. `"nrows"`, `"head:3"`, `"unique:city"`.
    fn from_str(s: &str) -> Result<Self> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name.trim(), Some(arg.trim())),
            None => (s.trim(), None),
        };

        let count = |default: usize| -> Result<usize> {
            match arg {
                Some(a) => a.parse().map_err(|_| {
                    CheckError::Config(format!("Operation '{name}' expects a row count, got '{a}'"))
                }),
                None => Ok(default),
            }
        };
        let column = || -> Result<String> {
            arg.filter(|a| !a.is_empty())
                .map(str::to_owned)
                .ok_or_else(|| {
                    CheckError::Config(format!(
                        "Operation '{name}' needs a column, e.g. '{name}:price'"
                    ))
                })
        };

        match name {
            "describe" => Ok(Self::Describe(DescribeOptions::default())),
            "columns" => Ok(Self::Columns),
            "dtypes" => Ok(Self::Dtypes),
            "head" => Ok(Self::Head(count(DEFAULT_ROWS)?)),
            "tail" => Ok(Self::Tail(count(DEFAULT_ROWS)?)),
            "info" => Ok(Self::Info),
            "memory_usage" => Ok(Self::MemoryUsage),
            "ncols" => Ok(Self::NCols),
            "nrows" => Ok(Self::NRows),
            "shape" => Ok(Self::Shape),
            "ndups" => Ok(Self::NDups(DuplicateKeep::default())),
            "nnulls" => Ok(Self::NNulls(NullOptions::default())),
            "nunique" => Ok(Self::NUnique(column()?)),
            "unique" => Ok(Self::Unique(column()?)),
            "value_counts" => Ok(Self::ValueCounts {
                column: column()?,
                max_rows: DEFAULT_MAX_ROWS,
            }),
            "print" => Ok(Self::Print {
                text: None,
                max_rows: count(DEFAULT_MAX_ROWS)?,
            }),
            "hist" => Ok(Self::Hist(PlotRequest::hist())),
            "plot" => Ok(Self::Plot(PlotRequest::line())),
            other => Err(CheckError::Config(format!(
                "Unknown check operation '{other}'. Available: {}",
                Self::IDENTIFIERS.join(", ")
            ))),
        }
    }
}
