//! Turning check results into text for an output surface.

use crate::config::Settings;
use polars::prelude::*;

/// Something a check wants to show.
#[derive(Debug, Clone)]
pub enum Rendered {
    Frame(DataFrame),
    Series(Series),
    Float(f64),
    Int(i64),
    Count(usize),
    Bool(bool),
    Text(String),
    List(Vec<String>),
}

impl Rendered {
    /// Formats the result with the configured precision and indentation.
    ///
    /// # Errors
    ///
    /// Fails only if rounding a float column fails inside polars.
    pub fn to_text(&self, settings: &Settings) -> PolarsResult<String> {
        let text = match self {
            Self::Frame(df) => format!("{}", round_frame(df, settings.precision)?),
            Self::Series(s) => format!("{}", round_series(s, settings.precision)?),
            Self::Float(v) => format_float(*v, settings.precision),
            Self::Int(v) => v.to_string(),
            Self::Count(v) => v.to_string(),
            Self::Bool(v) => v.to_string(),
            Self::Text(t) => t.clone(),
            Self::List(items) => format!("[{}]", items.join(", ")),
        };
        Ok(indent(text, settings))
    }
}

impl From<DataFrame> for Rendered {
    fn from(v: DataFrame) -> Self {
        Self::Frame(v)
    }
}

impl From<Series> for Rendered {
    fn from(v: Series) -> Self {
        Self::Series(v)
    }
}

impl From<Column> for Rendered {
    fn from(v: Column) -> Self {
        Self::Series(v.as_materialized_series().clone())
    }
}

impl From<f64> for Rendered {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for Rendered {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Rendered {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<usize> for Rendered {
    fn from(v: usize) -> Self {
        Self::Count(v)
    }
}

impl From<bool> for Rendered {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<String> for Rendered {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Rendered {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<Vec<String>> for Rendered {
    fn from(v: Vec<String>) -> Self {
        Self::List(v)
    }
}

// f64 only carries ~15 significant decimal digits.
const MAX_ROUNDING_DIGITS: usize = 15;

pub fn format_float(v: f64, precision: usize) -> String {
    let precision = precision.min(MAX_ROUNDING_DIGITS);
    format!("{v:.precision$}")
}

fn round_value(v: f64, precision: usize) -> f64 {
    let digits = i32::try_from(precision.min(MAX_ROUNDING_DIGITS)).unwrap_or(0);
    let factor = 10_f64.powi(digits);
    let scaled = v * factor;
    // Values this large have no fractional digits left to round.
    if !scaled.is_finite() {
        return v;
    }
    scaled.round() / factor
}

/// Rounds float series for display. Other dtypes are returned as they are.
pub fn round_series(s: &Series, precision: usize) -> PolarsResult<Series> {
    if !s.dtype().is_float() {
        return Ok(s.clone());
    }
    let cast = s.cast(&DataType::Float64)?;
    let rounded: Float64Chunked = cast
        .f64()?
        .into_iter()
        .map(|v| v.map(|x| round_value(x, precision)))
        .collect();
    Ok(rounded.with_name(s.name().clone()).into_series())
}

pub fn round_frame(df: &DataFrame, precision: usize) -> PolarsResult<DataFrame> {
    let columns = df
        .get_columns()
        .iter()
        .map(|c| round_series(c.as_materialized_series(), precision).map(Column::from))
        .collect::<PolarsResult<Vec<_>>>()?;
    DataFrame::new(columns)
}

fn indent(text: String, settings: &Settings) -> String {
    if !settings.indent_multiline || !text.contains('\n') {
        return text;
    }
    text.lines()
        .map(|line| format!("    {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_decorative(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1F000..=0x1FAFF     // pictographs, emoticons, transport, supplemental symbols
            | 0x2600..=0x27BF // miscellaneous symbols and dingbats
            | 0x2B00..=0x2BFF // arrows and stars
            | 0x2190..=0x21FF // arrows
            | 0x2139          // information source
            | 0x200D          // zero width joiner
            | 0xFE0E..=0xFE0F // variation selectors
    )
}

/// Removes decorative symbols from a label and normalises the spacing they leave.
pub fn strip_symbols(text: &str) -> String {
    text.chars()
        .filter(|c| !is_decorative(*c))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Applies the `use_emojis` setting to a label or message.
pub fn decorate(text: &str, settings: &Settings) -> String {
    if settings.use_emojis {
        text.trim().to_owned()
    } else {
        strip_symbols(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_symbols() {
        assert_eq!(strip_symbols("📏 Distributions"), "Distributions");
        assert_eq!(strip_symbols("🗂️ Data types"), "Data types");
        assert_eq!(strip_symbols("👯‍♂️ Duplicated rows"), "Duplicated rows");
        assert_eq!(strip_symbols("⬆️ First 5 rows"), "First 5 rows");
        assert_eq!(strip_symbols("ℹ️ Info"), "Info");
        assert_eq!(strip_symbols("☰ Rows"), "Rows");
        assert_eq!(strip_symbols("plain"), "plain");
    }

    #[test]
    fn test_decorate_keeps_symbols_by_default() {
        let settings = Settings::default();
        assert_eq!(decorate(" ✔️ Assertion passed ", &settings), "✔️ Assertion passed");
    }

    #[test]
    fn test_round_series_only_touches_floats() -> PolarsResult<()> {
        let floats = Series::new("x".into(), &[1.23456, 2.0]);
        let rounded = round_series(&floats, 2)?;
        let values: Vec<Option<f64>> = rounded.f64()?.into_iter().collect();
        assert_eq!(values, vec![Some(1.23), Some(2.0)]);
        assert_eq!(rounded.name().as_str(), "x");

        let ints = Series::new("n".into(), &[1_i64, 2]);
        assert!(round_series(&ints, 0)?.equals(&ints));
        Ok(())
    }

    #[test]
    fn test_rounding_keeps_large_values_finite() -> PolarsResult<()> {
        assert_eq!(round_value(1.0e306, 3), 1.0e306);
        assert_eq!(round_value(f64::MAX, 15), f64::MAX);
        assert_eq!(round_value(-1.0e300, 10), -1.0e300);
        assert!(round_value(f64::NAN, 3).is_nan());

        let s = Series::new("x".into(), &[1.0e306, 2.5]);
        let rounded = round_series(&s, 3)?;
        let values: Vec<Option<f64>> = rounded.f64()?.into_iter().collect();
        assert_eq!(values, vec![Some(1.0e306), Some(2.5)]);
        Ok(())
    }

    #[test]
    fn test_precision_capped_like_rounding() {
        let text = format_float(0.1, 40);
        let decimals = text.split_once('.').map(|(_, d)| d.len());
        assert_eq!(decimals, Some(MAX_ROUNDING_DIGITS));
        assert_eq!(format_float(2.0, 2), "2.00");
    }

    #[test]
    fn test_float_scalar_uses_precision() -> PolarsResult<()> {
        let settings = Settings {
            precision: 2,
            ..Settings::default()
        };
        assert_eq!(Rendered::Float(1.0 / 3.0).to_text(&settings)?, "0.33");
        assert_eq!(Rendered::Count(3).to_text(&settings)?, "3");
        Ok(())
    }

    #[test]
    fn test_indent_multiline() -> PolarsResult<()> {
        let settings = Settings {
            indent_multiline: true,
            ..Settings::default()
        };
        let text = Rendered::Text("a\nb".to_owned()).to_text(&settings)?;
        assert_eq!(text, "    a\n    b");
        let single = Rendered::Text("a".to_owned()).to_text(&settings)?;
        assert_eq!(single, "a");
        Ok(())
    }
}
