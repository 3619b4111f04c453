//! Process-wide check settings.
//!
//! Checks sit deep inside chained expressions, so there is no natural place to
//! thread a configuration value through them. Instead a single [`Settings`]
//! instance lives for the whole process. Every check takes one snapshot of it
//! through [`current`] and reads nothing else.
//!
//! ```
//! use framecheck::config;
//!
//! config::set_format([("precision", 7)])?;
//! assert_eq!(config::current().precision, 7);
//! config::reset_format();
//! assert_eq!(config::current().precision, 3);
//! # Ok::<(), framecheck::error::CheckError>(())
//! ```

use crate::error::{CheckError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{LazyLock, PoisonError, RwLock};

/// Prefix accepted in front of every option name.
pub const OPTION_PREFIX: &str = "framecheck.";

/// Environment variable that seeds the enabled flag at first access.
pub const ENABLED_ENV: &str = "FRAMECHECK_ENABLED";

/// Names of the presentation options accepted by [`set_format`].
pub const FORMAT_OPTIONS: [&str; 3] = ["precision", "use_emojis", "indent_multiline"];

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Whether checks run at all. When false every check returns its input untouched.
    pub enabled: bool,
    /// Decimal places used when displaying floating point values
    pub precision: usize,
    /// Whether labels and messages keep their decorative symbols
    pub use_emojis: bool,
    /// Whether multi-line results are indented under their label
    pub indent_multiline: bool,
}

impl Settings {
    pub const DEFAULT_PRECISION: usize = 3;

    const fn factory() -> Self {
        Self {
            enabled: true,
            precision: Self::DEFAULT_PRECISION,
            use_emojis: true,
            indent_multiline: false,
        }
    }

    /// Copy of these settings with checks switched off.
    pub fn disabled(self) -> Self {
        Self {
            enabled: false,
            ..self
        }
    }

    fn apply(&mut self, option: FormatOption) {
        match option {
            FormatOption::Precision(p) => self.precision = p,
            FormatOption::UseEmojis(b) => self.use_emojis = b,
            FormatOption::IndentMultiline(b) => self.indent_multiline = b,
        }
    }

    fn reset_format(&mut self) {
        *self = Self {
            enabled: self.enabled,
            ..Self::factory()
        };
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::factory()
    }
}

/// Value passed for an option in [`set_format`].
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl OptionValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Text(_) => "string",
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl TryFrom<usize> for OptionValue {
    type Error = CheckError;

    fn try_from(v: usize) -> Result<Self> {
        i64::try_from(v)
            .map(Self::Int)
            .map_err(|_| CheckError::Config(format!("Option value {v} is out of range")))
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl TryFrom<serde_json::Value> for OptionValue {
    type Error = CheckError;

    fn try_from(v: serde_json::Value) -> Result<Self> {
        match v {
            serde_json::Value::Bool(b) => Ok(Self::Bool(b)),
            serde_json::Value::Number(n) => n.as_i64().map(Self::Int).ok_or_else(|| {
                CheckError::Config(format!("Option values must be integers, got {n}"))
            }),
            serde_json::Value::String(s) => Ok(Self::Text(s)),
            other => Err(CheckError::Config(format!(
                "Unsupported option value: {other}"
            ))),
        }
    }
}

/// A validated presentation option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormatOption {
    Precision(usize),
    UseEmojis(bool),
    IndentMultiline(bool),
}

impl FormatOption {
    fn parse(name: &str, value: OptionValue) -> Result<Self> {
        let short = name.strip_prefix(OPTION_PREFIX).unwrap_or(name);
        match (short, value) {
            ("precision", OptionValue::Int(p)) => usize::try_from(p)
                .map(Self::Precision)
                .map_err(|_| {
                    CheckError::Config(format!(
                        "Option '{OPTION_PREFIX}precision' must be a non-negative integer, got {p}"
                    ))
                }),
            ("use_emojis", OptionValue::Bool(b)) => Ok(Self::UseEmojis(b)),
            ("indent_multiline", OptionValue::Bool(b)) => Ok(Self::IndentMultiline(b)),
            (known, other) if FORMAT_OPTIONS.contains(&known) => Err(CheckError::Config(format!(
                "Option '{OPTION_PREFIX}{known}' does not accept a {} value",
                other.type_name()
            ))),
            _ => Err(CheckError::Config(format!(
                "No option named '{OPTION_PREFIX}{short}'. Available options: {}",
                FORMAT_OPTIONS
                    .iter()
                    .map(|o| format!("{OPTION_PREFIX}{o}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}

static SETTINGS: LazyLock<RwLock<Settings>> = LazyLock::new(|| {
    let enabled = std::env::var(ENABLED_ENV)
        .map(|v| parse_enabled(&v))
        .unwrap_or(true);
    RwLock::new(Settings {
        enabled,
        ..Settings::factory()
    })
});

/// Interprets the value of [`ENABLED_ENV`]. Anything but an explicit "off" keeps checks on.
pub fn parse_enabled(value: &str) -> bool {
    !matches!(
        value.trim().to_lowercase().as_str(),
        "0" | "false" | "off" | "no"
    )
}

fn update(f: impl FnOnce(&mut Settings)) {
    let mut guard = SETTINGS.write().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard);
}

/// Snapshot of the current settings.
pub fn current() -> Settings {
    *SETTINGS.read().unwrap_or_else(PoisonError::into_inner)
}

/// Validates and applies presentation options.
///
/// Names may be given bare (`"precision"`) or fully qualified
/// (`"framecheck.precision"`). Nothing is applied unless every pair is valid.
///
/// # Errors
///
/// Returns [`CheckError::Config`] for an unknown name or a value of the wrong type.
pub fn set_format<I, K, V>(options: I) -> Result<()>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<OptionValue>,
{
    let parsed = options
        .into_iter()
        .map(|(name, value)| FormatOption::parse(name.as_ref(), value.into()))
        .collect::<Result<Vec<_>>>()?;

    update(|settings| {
        for option in parsed {
            settings.apply(option);
        }
    });
    tracing::debug!("Check format updated: {:?}", current());
    Ok(())
}

/// Restores the factory presentation options. The enabled flag is kept.
pub fn reset_format() {
    update(Settings::reset_format);
}

/// Reads a JSON object of option name to value and applies it with [`set_format`].
///
/// # Errors
///
/// Fails if the file cannot be read, is not a JSON object, or names an unknown option.
pub fn load_format(path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    let serde_json::Value::Object(map) = value else {
        return Err(CheckError::Config(format!(
            "Expected a JSON object of options in {}",
            path.display()
        )));
    };

    let options = map
        .into_iter()
        .map(|(name, value)| OptionValue::try_from(value).map(|v| (name, v)))
        .collect::<Result<Vec<_>>>()?;
    set_format(options)
}

/// Turns checks on for the whole process.
pub fn enable() {
    update(|s| s.enabled = true);
}

/// Turns checks off for the whole process. Assertions are skipped as well.
pub fn disable() {
    update(|s| s.enabled = false);
}

pub fn is_enabled() -> bool {
    current().enabled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_qualified_names() -> Result<()> {
        let option = FormatOption::parse("framecheck.precision", OptionValue::Int(5))?;
        assert_eq!(option, FormatOption::Precision(5));
        Ok(())
    }

    #[test]
    fn test_parse_rejects_unknown_name() {
        let err = FormatOption::parse("colour", OptionValue::Bool(true));
        assert!(
            matches!(err, Err(CheckError::Config(ref msg)) if msg.contains("framecheck.precision")),
            "error should list the available options: {err:?}"
        );
    }

    #[test]
    fn test_parse_rejects_wrong_type() {
        assert!(FormatOption::parse("use_emojis", OptionValue::Int(1)).is_err());
        assert!(FormatOption::parse("precision", OptionValue::Int(-1)).is_err());
        assert!(FormatOption::parse("precision", OptionValue::from("3")).is_err());
    }

    #[test]
    fn test_usize_values_out_of_range() -> Result<()> {
        assert_eq!(OptionValue::try_from(4_usize)?, OptionValue::Int(4));
        assert!(matches!(
            OptionValue::try_from(usize::MAX),
            Err(CheckError::Config(_))
        ));
        Ok(())
    }

    #[test]
    fn test_reset_format_keeps_enabled_flag() {
        let mut settings = Settings {
            enabled: false,
            precision: 9,
            use_emojis: false,
            indent_multiline: true,
        };
        settings.reset_format();
        assert_eq!(settings, Settings::default().disabled());
    }

    #[test]
    fn test_parse_enabled() {
        assert!(!parse_enabled("0"));
        assert!(!parse_enabled(" False "));
        assert!(!parse_enabled("off"));
        assert!(parse_enabled("1"));
        assert!(parse_enabled("yes"));
    }

    #[test]
    fn test_settings_serialize() -> Result<()> {
        let json = serde_json::to_string(&Settings::default())?;
        let back: Settings = serde_json::from_str(&json)?;
        assert_eq!(back, Settings::default());
        Ok(())
    }
}
