//! Timing pipeline stages.
//!
//! A [`Stopwatch`] is an immutable token taken at the start of a stretch of
//! pipeline; reporting it never changes it, so one token can be reported at
//! several points.
//!
//! ```
//! use framecheck::stopwatch::{Stopwatch, TimeUnit};
//!
//! let watch = Stopwatch::start();
//! let elapsed = watch.elapsed(TimeUnit::Auto);
//! assert_eq!(elapsed.unit, TimeUnit::Seconds);
//! ```

use crate::config::Settings;
use crate::error::{CheckError, Result};
use crate::surface::Surface;
use chrono::{DateTime, Local};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    /// Seconds below a minute, minutes below an hour, hours beyond
    Auto,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
}

impl TimeUnit {
    /// The concrete unit used for `elapsed`.
    pub fn resolve(self, elapsed: Duration) -> Self {
        match self {
            Self::Auto => match elapsed.as_secs() {
                0..60 => Self::Seconds,
                60..3600 => Self::Minutes,
                _ => Self::Hours,
            },
            unit => unit,
        }
    }

    fn convert(self, elapsed: Duration) -> f64 {
        let secs = elapsed.as_secs_f64();
        match self.resolve(elapsed) {
            Self::Milliseconds => secs * 1_000.0,
            Self::Minutes => secs / 60.0,
            Self::Hours => secs / 3_600.0,
            Self::Seconds | Self::Auto => secs,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Milliseconds => "milliseconds",
            Self::Seconds => "seconds",
            Self::Minutes => "minutes",
            Self::Hours => "hours",
        };
        f.write_str(name)
    }
}

impl FromStr for TimeUnit {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "ms" | "millisecond" | "milliseconds" => Ok(Self::Milliseconds),
            "s" | "sec" | "second" | "seconds" => Ok(Self::Seconds),
            "m" | "min" | "minute" | "minutes" => Ok(Self::Minutes),
            "h" | "hour" | "hours" => Ok(Self::Hours),
            other => Err(CheckError::Config(format!(
                "Unrecognized time unit '{other}'. Use one of: auto, milliseconds, seconds, minutes, hours"
            ))),
        }
    }
}

/// Elapsed time expressed in a concrete unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Elapsed {
    pub duration: Duration,
    pub value: f64,
    /// Never [`TimeUnit::Auto`]
    pub unit: TimeUnit,
}

impl Elapsed {
    pub fn format(&self, precision: usize) -> String {
        format!("{:.precision$} {}", self.value, self.unit)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
    started_at: DateTime<Local>,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            started_at: Local::now(),
        }
    }

    /// Wall-clock time the stopwatch was started.
    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn elapsed(&self, units: TimeUnit) -> Elapsed {
        let duration = self.started.elapsed();
        Elapsed {
            duration,
            value: units.convert(duration),
            unit: units.resolve(duration),
        }
    }

    /// Like [`Stopwatch::elapsed`] with the unit given by name.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Config`] for an unrecognized unit.
    pub fn elapsed_in(&self, units: &str) -> Result<Elapsed> {
        Ok(self.elapsed(units.parse()?))
    }

    /// Emits the start time.
    ///
    /// # Errors
    ///
    /// Fails if the surface cannot be written.
    pub fn announce(&self, surface: &dyn Surface) -> Result<()> {
        surface.emit(
            Some("Started timer"),
            &self.started_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        )
    }
}

/// Computes the elapsed time of `watch` and emits it as `"{label}: {value} {unit}"`.
///
/// # Errors
///
/// Returns [`CheckError::Config`] for an unrecognized unit, or a surface failure.
pub fn report_elapsed(
    watch: &Stopwatch,
    label: &str,
    units: &str,
    surface: &dyn Surface,
    settings: &Settings,
) -> Result<Elapsed> {
    let elapsed = watch.elapsed_in(units)?;
    surface.emit(
        Some(&crate::checks::render::decorate(label, settings)),
        &elapsed.format(settings.precision),
    )?;
    Ok(elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Buffer;

    #[test]
    fn test_auto_resolution() {
        assert_eq!(TimeUnit::Auto.resolve(Duration::from_secs(5)), TimeUnit::Seconds);
        assert_eq!(TimeUnit::Auto.resolve(Duration::from_secs(90)), TimeUnit::Minutes);
        assert_eq!(TimeUnit::Auto.resolve(Duration::from_secs(7_200)), TimeUnit::Hours);
        assert_eq!(TimeUnit::Hours.resolve(Duration::from_secs(5)), TimeUnit::Hours);
    }

    #[test]
    fn test_conversion() {
        let d = Duration::from_secs(90);
        assert!((TimeUnit::Minutes.convert(d) - 1.5).abs() < 1e-9);
        assert!((TimeUnit::Milliseconds.convert(d) - 90_000.0).abs() < 1e-9);
        assert!((TimeUnit::Auto.convert(d) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_unit_is_config_error() {
        assert!(matches!(
            "fortnights".parse::<TimeUnit>(),
            Err(CheckError::Config(_))
        ));
        assert_eq!("Minutes".parse::<TimeUnit>().ok(), Some(TimeUnit::Minutes));
    }

    #[test]
    fn test_report_elapsed() -> Result<()> {
        let watch = Stopwatch::start();
        let buffer = Buffer::new();
        let elapsed = report_elapsed(&watch, "Load", "ms", &buffer, &Settings::default())?;
        assert_eq!(elapsed.unit, TimeUnit::Milliseconds);
        assert!(buffer.contents().starts_with("Load: "));
        assert!(buffer.contents().ends_with(" milliseconds"));

        assert!(report_elapsed(&watch, "Load", "weeks", &buffer, &Settings::default()).is_err());
        assert_eq!(buffer.len(), 1);
        Ok(())
    }
}
