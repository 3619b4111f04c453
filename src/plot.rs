//! Visualization backends for the `hist` and `plot` checks.
//!
//! The executor never draws anything itself: it hands the view and a
//! [`PlotRequest`] to a [`PlotBackend`]. The bundled [`TextPlotter`] draws on
//! the output surface, which is enough for terminals and logs. Richer backends
//! receive the request's `extra` options untouched.

use crate::error::Result;
use crate::surface::Surface;
use polars::prelude::*;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotKind {
    /// One histogram per numeric column
    Hist,
    /// One line per numeric column, in row order
    Line,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotRequest {
    pub kind: PlotKind,
    /// Overrides the check label as the plot title
    pub title: Option<String>,
    /// Number of histogram bins
    pub bins: usize,
    /// Width of the drawing in characters (text backends) or a hint for others
    pub width: usize,
    /// Decimal places for axis values; the executor fills it from the settings when unset
    pub precision: Option<usize>,
    /// Backend specific options, forwarded verbatim
    pub extra: BTreeMap<String, String>,
}

impl PlotRequest {
    pub fn hist() -> Self {
        Self {
            kind: PlotKind::Hist,
            title: None,
            bins: 10,
            width: 40,
            precision: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn line() -> Self {
        Self {
            kind: PlotKind::Line,
            width: 60,
            ..Self::hist()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

pub trait PlotBackend {
    /// Draws `view` as described by `request`.
    ///
    /// # Errors
    ///
    /// Backend failures, or polars errors while reading numeric columns.
    fn render(&self, view: &DataFrame, request: &PlotRequest, surface: &dyn Surface) -> Result<()>;
}

/// Draws histograms as bar rows and line plots as sparklines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextPlotter;

const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

impl PlotBackend for TextPlotter {
    fn render(&self, view: &DataFrame, request: &PlotRequest, surface: &dyn Surface) -> Result<()> {
        let precision = request.precision.unwrap_or(2);
        let mut sections = Vec::new();

        for col in view.get_columns() {
            if !col.dtype().is_primitive_numeric() {
                continue;
            }
            let cast = col.as_materialized_series().cast(&DataType::Float64)?;
            let values: Vec<f64> = cast.f64()?.into_iter().flatten().collect();
            let body = match request.kind {
                PlotKind::Hist => draw_histogram(&values, request.bins, request.width, precision),
                PlotKind::Line => draw_sparkline(&values, request.width, precision),
            };
            sections.push(format!("{}\n{body}", col.name()));
        }

        let body = if sections.is_empty() {
            "(no numeric columns to plot)".to_owned()
        } else {
            sections.join("\n\n")
        };
        surface.emit(request.title.as_deref(), &body)
    }
}

/// Equal-width bins as `(lower, upper, count)`.
pub fn histogram(values: &[f64], bins: usize) -> Vec<(f64, f64, usize)> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let (Some(min), Some(max)) = (
        finite.iter().copied().reduce(f64::min),
        finite.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };

    if (max - min).abs() < f64::EPSILON {
        return vec![(min, max, finite.len())];
    }

    let bins = bins.max(1);
    let width = (max - min) / bins as f64;
    let mut counts = vec![0_usize; bins];
    for v in &finite {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        if let Some(count) = counts.get_mut(idx) {
            *count += 1;
        }
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            (
                min + width * i as f64,
                min + width * (i + 1) as f64,
                count,
            )
        })
        .collect()
}

fn draw_histogram(values: &[f64], bins: usize, width: usize, precision: usize) -> String {
    let bins = histogram(values, bins);
    let peak = bins.iter().map(|b| b.2).max().unwrap_or(0).max(1);
    bins.iter()
        .map(|(lo, hi, count)| {
            let bar = "█".repeat(count * width / peak);
            format!("{lo:>12.precision$} .. {hi:<12.precision$} | {bar} {count}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn draw_sparkline(values: &[f64], width: usize, precision: usize) -> String {
    if values.is_empty() {
        return "(empty)".to_owned();
    }
    let chunk = values.len().div_ceil(width.max(1));
    let points: Vec<f64> = values
        .chunks(chunk)
        .map(|c| c.iter().sum::<f64>() / c.len() as f64)
        .collect();

    let min = points.iter().copied().fold(f64::INFINITY, f64::min);
    let max = points.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    let line: String = points
        .iter()
        .map(|p| {
            let level = if span > 0.0 {
                (((p - min) / span) * (SPARKS.len() - 1) as f64).round() as usize
            } else {
                0
            };
            SPARKS.get(level).copied().unwrap_or('█')
        })
        .collect();
    format!("{line}  [{min:.precision$} .. {max:.precision$}]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Buffer;

    #[test]
    fn test_histogram_counts_every_value() {
        let bins = histogram(&[1.0, 1.0, 2.0, 3.0, 10.0], 5);
        assert_eq!(bins.len(), 5);
        assert_eq!(bins.iter().map(|b| b.2).sum::<usize>(), 5);
        assert_eq!(bins.first().map(|b| b.2), Some(3));
        assert_eq!(bins.last().map(|b| b.2), Some(1));
    }

    #[test]
    fn test_histogram_single_value() {
        assert_eq!(histogram(&[2.0, 2.0, 2.0], 10), vec![(2.0, 2.0, 3)]);
        assert!(histogram(&[], 10).is_empty());
    }

    #[test]
    fn test_sparkline_spans_levels() {
        let line = draw_sparkline(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0], 8, 0);
        assert!(line.starts_with("▁▂▃▄▅▆▇█"), "{line}");
        assert!(line.ends_with("[0 .. 7]"), "{line}");
    }

    #[test]
    fn test_text_plotter_skips_text_columns() -> Result<()> {
        let df = df!(
            "name" => &["a", "b", "c"],
            "value" => &[1.0, 2.0, 3.0]
        )?;
        let buffer = Buffer::new();
        TextPlotter.render(&df, &PlotRequest::hist().title("Values"), &buffer)?;
        let out = buffer.contents();
        assert!(out.starts_with("Values\nvalue\n"), "{out}");
        assert!(!out.contains("name"), "{out}");
        Ok(())
    }
}
