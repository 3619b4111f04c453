//! The side-channel check executor.
//!
//! A check runs for its side effect and hands back the exact value it was
//! given. Each check:
//!
//! 1. takes one snapshot of the [`Settings`],
//! 2. returns the value at once if checks are disabled, without touching the
//!    projection, the subset or the operation,
//! 3. otherwise derives a *view*: the projection function first, then the
//!    column subset,
//! 4. runs the operation on the view (print, plot, write, assert),
//! 5. returns the original reference, never the view.
//!
//! Steps 1, 2, 3 and 5 live in one place, [`Checks::run_with`]; operations
//! only describe step 4.
//!
//! ```no_run
//! use framecheck::CheckExt as _;
//! use polars::prelude::*;
//!
//! # fn main() -> framecheck::error::Result<()> {
//! let df = df!("a" => &[Some(1), Some(2), None], "b" => &[3, 4, 5])?;
//! let cleaned = df
//!     .check().nnulls()?
//!     .filter(&df.column("a")?.is_not_null())?;
//! let total = cleaned
//!     .check().subset(["b"]).describe()?
//!     .check().assert_data(col("b").sum().eq(lit(7)))?
//!     .height();
//! # Ok(())
//! # }
//! ```

pub mod condition;
pub mod operation;
pub mod render;
pub mod stats;


use crate::config::{self, OptionValue, Settings};
use crate::error::{CheckError, Result};
use crate::export::{self, ExportFormat};
use crate::plot::{PlotBackend, PlotRequest, TextPlotter};
use crate::stopwatch::Stopwatch;
use crate::surface::{Stdout, Surface};
use condition::Condition;
use operation::{DEFAULT_MAX_ROWS, DescribeOptions, NullOptions, Operation};
use polars::prelude::*;
use render::{Rendered, decorate};
use stats::DuplicateKeep;
use std::borrow::Cow;
use std::path::Path;

/// A value checks can inspect: a table or a single named column.
pub trait Tabular {
    /// The value as a frame. A series becomes a one-column frame.
    fn to_frame(&self) -> Cow<'_, DataFrame>;
}

impl Tabular for DataFrame {
    fn to_frame(&self) -> Cow<'_, DataFrame> {
        Cow::Borrowed(self)
    }
}

impl Tabular for Series {
    fn to_frame(&self) -> Cow<'_, DataFrame> {
        Cow::Owned(self.clone().into_frame())
    }
}

/// Adds `.check()` to every [`Tabular`] value.
pub trait CheckExt: Tabular {
    fn check(&self) -> Checks<'_, Self> {
        Checks::new(self)
    }
}

impl<T: Tabular + ?Sized> CheckExt for T {}

type Projection<'a> = Box<dyn Fn(&DataFrame) -> PolarsResult<DataFrame> + 'a>;

static STDOUT: Stdout = Stdout;
static TEXT_PLOTTER: TextPlotter = TextPlotter;

/// Options for [`Checks::assert_data_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertOptions {
    /// Shown on success when `verbose` is set
    pub pass_message: String,
    /// Carried by the validation error, or shown when `raise` is off
    pub fail_message: String,
    /// Fail the check when the condition is false; otherwise only report it
    pub raise: bool,
    /// Report successes too
    pub verbose: bool,
}

impl Default for AssertOptions {
    fn default() -> Self {
        Self {
            pass_message: "✔️ Assertion passed".to_owned(),
            fail_message: "✘ Assertion failed".to_owned(),
            raise: true,
            verbose: false,
        }
    }
}

/// Options for [`Checks::write_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteOptions {
    /// Overrides inference from the path suffix
    pub format: Option<ExportFormat>,
    /// Report the written path
    pub verbose: bool,
}

/// Everything an operation needs while it runs.
pub(crate) struct Context<'c> {
    pub(crate) view: DataFrame,
    pub(crate) settings: Settings,
    pub(crate) surface: &'c dyn Surface,
    pub(crate) plotter: &'c dyn PlotBackend,
    pub(crate) label: Option<&'c str>,
    pub(crate) subset: Option<&'c [PlSmallStr]>,
}

impl Context<'_> {
    pub(crate) fn decorate(&self, text: &str) -> String {
        decorate(text, &self.settings)
    }

    /// The caller's label if given, else `default`, with symbols handled per settings.
    pub(crate) fn label_or(&self, default: Option<String>) -> Option<String> {
        self.label
            .map(str::to_owned)
            .or(default)
            .map(|l| self.decorate(&l))
    }

    pub(crate) fn emit(&self, label: Option<&str>, rendered: &Rendered) -> Result<()> {
        let body = rendered.to_text(&self.settings)?;
        self.surface.emit(label, &body)
    }
}

/// A pending check on a borrowed value.
///
/// Built by [`CheckExt::check`], configured with the builder methods, and
/// consumed by exactly one operation, which returns the borrowed value.
#[must_use = "a check does nothing until an operation is called on it"]
pub struct Checks<'a, T: ?Sized> {
    data: &'a T,
    label: Option<String>,
    subset: Option<Vec<PlSmallStr>>,
    projection: Option<Projection<'a>>,
    surface: Option<&'a dyn Surface>,
    plotter: Option<&'a dyn PlotBackend>,
    settings: Option<Settings>,
}

impl<'a, T: Tabular + ?Sized> Checks<'a, T> {
    pub fn new(data: &'a T) -> Self {
        Self {
            data,
            label: None,
            subset: None,
            projection: None,
            surface: None,
            plotter: None,
            settings: None,
        }
    }

    /// Label shown with the output instead of the operation's default.
    pub fn name(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Limits the view to these columns. Applied after [`Checks::map`].
    pub fn subset<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PlSmallStr>,
    {
        self.subset = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Shapes what the check sees. The returned value is never affected.
    pub fn map<F>(mut self, f: F) -> Self
    where
        F: Fn(&DataFrame) -> PolarsResult<DataFrame> + 'a,
    {
        self.projection = Some(Box::new(f));
        self
    }

    /// Sends output here instead of standard output.
    pub fn surface(mut self, surface: &'a dyn Surface) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Draws `hist` and `plot` with this backend instead of the text plotter.
    pub fn plotter(mut self, plotter: &'a dyn PlotBackend) -> Self {
        self.plotter = Some(plotter);
        self
    }

    /// Uses these settings instead of the process-wide snapshot.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    fn derive_view(&self) -> PolarsResult<DataFrame> {
        let frame = self.data.to_frame();
        let projected = match &self.projection {
            Some(f) => f(&frame)?,
            None => frame.into_owned(),
        };
        match &self.subset {
            Some(columns) => projected.select(columns.iter().cloned()),
            None => Ok(projected),
        }
    }

    /// Runs `body` against the view and returns the original value.
    fn run_with<F>(self, operation: &str, body: F) -> Result<&'a T>
    where
        F: FnOnce(&Context<'_>) -> Result<()>,
    {
        let settings = self.settings.unwrap_or_else(config::current);
        if !settings.enabled {
            tracing::debug!(operation, "Check skipped, checks are disabled");
            return Ok(self.data);
        }

        let view = self.derive_view()?;
        tracing::debug!(
            operation,
            rows = view.height(),
            columns = view.width(),
            "Running check"
        );

        let ctx = Context {
            view,
            settings,
            surface: self.surface.unwrap_or(&STDOUT),
            plotter: self.plotter.unwrap_or(&TEXT_PLOTTER),
            label: self.label.as_deref(),
            subset: self.subset.as_deref(),
        };
        body(&ctx)?;
        Ok(self.data)
    }

    /// Runs any catalog operation.
    ///
    /// Single-column operations replace the subset with their column.
    ///
    /// # Errors
    ///
    /// Polars errors from the wrapped primitive (unknown column, ...), passed
    /// through unchanged, and output surface failures.
    pub fn run(mut self, operation: Operation) -> Result<&'a T> {
        if let Some(column) = operation.column() {
            self.subset = Some(vec![column.into()]);
        }
        self.run_with(operation.identifier(), |ctx| operation.execute(ctx))
    }

    /// Runs an operation given by identifier, such as `"nrows"` or `"head:3"`.
    ///
    /// # Errors
    ///
    /// [`CheckError::Config`] for an unknown identifier, otherwise as [`Checks::run`].
    pub fn run_named(self, identifier: &str) -> Result<&'a T> {
        let operation = identifier.parse()?;
        self.run(operation)
    }

    /// Distribution statistics of every column.
    ///
    /// # Errors
    ///
    /// See [`Checks::run`].
    pub fn describe(self) -> Result<&'a T> {
        self.run(Operation::Describe(DescribeOptions::default()))
    }

    /// # Errors
    ///
    /// See [`Checks::run`]; percentiles outside `[0, 1]` are rejected by polars.
    pub fn describe_with(self, options: DescribeOptions) -> Result<&'a T> {
        self.run(Operation::Describe(options))
    }

    /// # Errors
    ///
    /// See [`Checks::run`].
    pub fn columns(self) -> Result<&'a T> {
        self.run(Operation::Columns)
    }

    /// # Errors
    ///
    /// See [`Checks::run`].
    pub fn dtypes(self) -> Result<&'a T> {
        self.run(Operation::Dtypes)
    }

    /// # Errors
    ///
    /// See [`Checks::run`].
    pub fn head(self, n: usize) -> Result<&'a T> {
        self.run(Operation::Head(n))
    }

    /// # Errors
    ///
    /// See [`Checks::run`].
    pub fn tail(self, n: usize) -> Result<&'a T> {
        self.run(Operation::Tail(n))
    }

    /// # Errors
    ///
    /// See [`Checks::run`].
    pub fn info(self) -> Result<&'a T> {
        self.run(Operation::Info)
    }

    /// # Errors
    ///
    /// See [`Checks::run`].
    pub fn memory_usage(self) -> Result<&'a T> {
        self.run(Operation::MemoryUsage)
    }

    /// # Errors
    ///
    /// See [`Checks::run`].
    pub fn ncols(self) -> Result<&'a T> {
        self.run(Operation::NCols)
    }

    /// # Errors
    ///
    /// See [`Checks::run`].
    pub fn nrows(self) -> Result<&'a T> {
        self.run(Operation::NRows)
    }

    /// # Errors
    ///
    /// See [`Checks::run`].
    pub fn shape(self) -> Result<&'a T> {
        self.run(Operation::Shape)
    }

    /// Number of rows repeating an earlier row.
    ///
    /// # Errors
    ///
    /// See [`Checks::run`].
    pub fn ndups(self) -> Result<&'a T> {
        self.run(Operation::NDups(DuplicateKeep::default()))
    }

    /// # Errors
    ///
    /// See [`Checks::run`].
    pub fn ndups_with(self, keep: DuplicateKeep) -> Result<&'a T> {
        self.run(Operation::NDups(keep))
    }

    /// Null count of every column.
    ///
    /// # Errors
    ///
    /// See [`Checks::run`].
    pub fn nnulls(self) -> Result<&'a T> {
        self.run(Operation::NNulls(NullOptions::default()))
    }

    /// # Errors
    ///
    /// See [`Checks::run`].
    pub fn nnulls_with(self, options: NullOptions) -> Result<&'a T> {
        self.run(Operation::NNulls(options))
    }

    /// # Errors
    ///
    /// See [`Checks::run`].
    pub fn nunique(self, column: &str) -> Result<&'a T> {
        self.run(Operation::NUnique(column.to_owned()))
    }

    /// # Errors
    ///
    /// See [`Checks::run`].
    pub fn unique(self, column: &str) -> Result<&'a T> {
        self.run(Operation::Unique(column.to_owned()))
    }

    /// Most frequent values of `column`; `max_rows = 0` shows all of them.
    ///
    /// # Errors
    ///
    /// See [`Checks::run`].
    pub fn value_counts(self, column: &str, max_rows: usize) -> Result<&'a T> {
        self.run(Operation::ValueCounts {
            column: column.to_owned(),
            max_rows,
        })
    }

    /// First rows of the view.
    ///
    /// # Errors
    ///
    /// See [`Checks::run`].
    pub fn print(self) -> Result<&'a T> {
        self.run(Operation::Print {
            text: None,
            max_rows: DEFAULT_MAX_ROWS,
        })
    }

    /// # Errors
    ///
    /// See [`Checks::run`].
    pub fn print_rows(self, max_rows: usize) -> Result<&'a T> {
        self.run(Operation::Print {
            text: None,
            max_rows,
        })
    }

    /// Emits free text, for marking a point in the pipeline.
    ///
    /// # Errors
    ///
    /// Output surface failures.
    pub fn print_text(self, text: impl Into<String>) -> Result<&'a T> {
        self.run(Operation::Print {
            text: Some(text.into()),
            max_rows: DEFAULT_MAX_ROWS,
        })
    }

    /// # Errors
    ///
    /// See [`Checks::run`].
    pub fn hist(self) -> Result<&'a T> {
        self.run(Operation::Hist(PlotRequest::hist()))
    }

    /// # Errors
    ///
    /// See [`Checks::run`].
    pub fn hist_with(self, request: PlotRequest) -> Result<&'a T> {
        self.run(Operation::Hist(request))
    }

    /// # Errors
    ///
    /// See [`Checks::run`].
    pub fn plot(self) -> Result<&'a T> {
        self.run(Operation::Plot(PlotRequest::line()))
    }

    /// # Errors
    ///
    /// See [`Checks::run`].
    pub fn plot_with(self, request: PlotRequest) -> Result<&'a T> {
        self.run(Operation::Plot(request))
    }

    /// Renders whatever `f` computes from the view.
    ///
    /// # Errors
    ///
    /// Errors returned by `f`, passed through unchanged.
    pub fn evaluate<R, F>(self, f: F) -> Result<&'a T>
    where
        F: FnOnce(&DataFrame) -> PolarsResult<R>,
        R: Into<Rendered>,
    {
        self.run_with("evaluate", |ctx| {
            let rendered = f(&ctx.view)?.into();
            ctx.emit(ctx.label_or(None).as_deref(), &rendered)
        })
    }

    /// Fails with a validation error unless `condition` holds for the view.
    ///
    /// With checks disabled the condition is not evaluated and nothing fails.
    ///
    /// # Errors
    ///
    /// [`CheckError::Validation`] when the condition is false, or polars errors
    /// raised while evaluating it.
    pub fn assert_data(self, condition: impl Into<Condition<'a>>) -> Result<&'a T> {
        self.assert_data_with(condition, AssertOptions::default())
    }

    /// # Errors
    ///
    /// See [`Checks::assert_data`]; with `raise` off only evaluation errors remain.
    pub fn assert_data_with(
        self,
        condition: impl Into<Condition<'a>>,
        options: AssertOptions,
    ) -> Result<&'a T> {
        let condition = condition.into();
        self.run_with("assert_data", |ctx| {
            let description = condition.description();
            if condition.holds(&ctx.view)? {
                if options.verbose {
                    let label = ctx.label_or(Some(options.pass_message.clone()));
                    ctx.emit(label.as_deref(), &Rendered::Text(description))?;
                }
                return Ok(());
            }

            let message = ctx.decorate(&options.fail_message);
            if options.raise {
                return Err(CheckError::Validation {
                    message,
                    condition: description,
                });
            }
            tracing::warn!("{message}: {description}");
            ctx.emit(Some(&message), &Rendered::Text(description))
        })
    }

    /// Writes the view to `path`, inferring the format from its suffix.
    ///
    /// # Errors
    ///
    /// [`CheckError::Export`] for an unsupported suffix, I/O and polars writer errors.
    pub fn write(self, path: impl AsRef<Path>) -> Result<&'a T> {
        self.write_with(path, WriteOptions::default())
    }

    /// Like [`Checks::write`]. When `path` is an existing directory the file is
    /// named after the check label and `options.format` must be set.
    ///
    /// # Errors
    ///
    /// See [`Checks::write`].
    pub fn write_with(self, path: impl AsRef<Path>, options: WriteOptions) -> Result<&'a T> {
        let path = path.as_ref();
        self.run_with("write", |ctx| {
            let stem = ctx.label.unwrap_or("export");
            let (target, format) = export::resolve_target(path, stem, options.format)?;
            export::write_frame(&ctx.view, &target, format)?;
            if options.verbose {
                let label = ctx.decorate("📦 Wrote file");
                ctx.emit(Some(&label), &Rendered::Text(target.display().to_string()))?;
            }
            Ok(())
        })
    }

    /// Reports how long ago `watch` was started, e.g. `units = "minutes"` or `"auto"`.
    ///
    /// The stopwatch is taken before the chain and reported from inside it,
    /// as often as needed:
    ///
    /// ```no_run
    /// use framecheck::surface::Stdout;
    /// use framecheck::{CheckExt as _, Stopwatch};
    /// use polars::prelude::*;
    ///
    /// # fn main() -> framecheck::error::Result<()> {
    /// let watch = Stopwatch::start();
    /// watch.announce(&Stdout)?;
    ///
    /// let df = df!("a" => &[3, 1, 2])?;
    /// let sorted = df
    ///     .check().name("Loaded").time_elapsed(&watch, "ms")?
    ///     .sort(["a"], Default::default())?;
    /// sorted.check().name("Sorted").time_elapsed(&watch, "auto")?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// [`CheckError::Config`] for an unrecognized unit.
    pub fn time_elapsed(self, watch: &Stopwatch, units: &str) -> Result<&'a T> {
        self.run_with("time_elapsed", |ctx| {
            let elapsed = watch.elapsed_in(units)?;
            let label = ctx.label_or(Some("Time elapsed".to_owned()));
            ctx.emit(
                label.as_deref(),
                &Rendered::Text(elapsed.format(ctx.settings.precision)),
            )
        })
    }

    /// Applies presentation options from inside a chain. Runs even when checks are disabled.
    ///
    /// # Errors
    ///
    /// See [`config::set_format`].
    pub fn set_format<I, K, V>(self, options: I) -> Result<&'a T>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<OptionValue>,
    {
        config::set_format(options)?;
        Ok(self.data)
    }

    /// Restores factory presentation options from inside a chain.
    pub fn reset_format(self) -> &'a T {
        config::reset_format();
        self.data
    }
}
