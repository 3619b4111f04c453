//! Error handling for checks.
//!
//! ## Error categories
//!
//! Checks only fail in three ways:
//!
//! - [`CheckError::Config`]: an unknown option name, a value of the wrong
//!   type, or an unknown time unit.
//! - [`CheckError::Validation`]: an [`assert_data`] condition did not hold.
//!   This is the one failure that is part of normal usage (data-quality gating).
//! - Pass-through failures: whatever the table engine reports while a check
//!   reads its view (unknown column, invalid cast, ...). These are carried
//!   as [`CheckError::Polars`] exactly as polars produced them.
//!
//! ```
//! use framecheck::error::CheckError;
//!
//! fn describe_failure(err: &CheckError) -> &'static str {
//!     match err {
//!         CheckError::Validation { .. } => "data quality gate",
//!         CheckError::Polars(_) => "table engine",
//!         CheckError::Config(_) => "settings",
//!         _ => "other",
//!     }
//! }
//! ```
//!
//! ## Context on I/O failures
//!
//! The `ResultExt` trait adds `.context()` to any `Result` whose error
//! converts into [`CheckError`]. The export backend uses it to say which file
//! could not be written:
//!
//! ```no_run
//! use framecheck::error::ResultExt as _;
//!
//! fn touch(path: &str) -> framecheck::error::Result<()> {
//!     std::fs::write(path, b"").context("Failed to create export target")?;
//!     Ok(())
//! }
//! ```
//!
//! [`assert_data`]: crate::Checks::assert_data

use polars::error::PolarsError;
use std::fmt;

/// Main error type for check operations.
#[derive(Debug)]
pub enum CheckError {
    /// Unknown option, wrongly typed option value, or unknown time unit
    Config(String),

    /// An assertion condition evaluated false
    Validation {
        /// Caller-supplied or default failure message
        message: String,
        /// Rendering of the condition that failed
        condition: String,
    },

    /// The export backend could not handle the destination
    Export(String),

    /// Failure raised by the table engine, passed through untouched
    Polars(PolarsError),

    /// I/O errors (output surface, file export)
    Io(std::io::Error),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Validation { message, condition } => write!(f, "{message}: {condition}"),
            Self::Export(msg) => write!(f, "Export error: {msg}"),
            Self::Polars(e) => write!(f, "{e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Polars(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CheckError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<PolarsError> for CheckError {
    fn from(err: PolarsError) -> Self {
        Self::Polars(err)
    }
}

impl From<serde_json::Error> for CheckError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<rust_xlsxwriter::XlsxError> for CheckError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Export(format!("Spreadsheet write failed: {err}"))
    }
}

impl From<fmt::Error> for CheckError {
    fn from(err: fmt::Error) -> Self {
        Self::Other(format!("Formatting failed: {err}"))
    }
}

impl CheckError {
    /// Whether this is the failure raised by a false assertion.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// Result type alias for check operations.
pub type Result<T> = std::result::Result<T, CheckError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    ///
    /// # Errors
    ///
    /// Returns the original error wrapped with `msg`.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    ///
    /// # Errors
    ///
    /// Returns the original error wrapped with the closure's message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<CheckError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: CheckError = e.into();
            CheckError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: CheckError = e.into();
            CheckError::Other(format!("{}: {}", f(), err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CheckError::Config("No option named 'colour'".to_owned());
        assert_eq!(
            err.to_string(),
            "Configuration error: No option named 'colour'"
        );
    }

    #[test]
    fn test_validation_display_joins_message_and_condition() {
        let err = CheckError::Validation {
            message: "Assertion failed".to_owned(),
            condition: "col(\"b\").sum() == 12".to_owned(),
        };
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Assertion failed: col(\"b\").sum() == 12");
    }

    #[test]
    fn test_polars_error_is_not_translated() {
        let err: CheckError =
            PolarsError::ColumnNotFound("missing".into()).into();
        assert!(matches!(err, CheckError::Polars(PolarsError::ColumnNotFound(_))));
    }

    #[test]
    fn test_result_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file.csv",
        ));

        let result: Result<()> = result.context("Failed to write file");
        assert!(
            result
                .err()
                .is_some_and(|e| e.to_string().contains("Failed to write file")),
            "context should prefix the message"
        );
    }
}
