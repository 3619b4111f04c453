//! # Framecheck - Inspection Checks for Polars Pipelines
//!
//! Framecheck lets you look inside a chain of table transformations without
//! breaking it. Every check prints, plots, writes or asserts something about
//! the table and hands back the very same value, so it can sit between any two
//! steps of a pipeline.
//!
//! ## Quick Start
//!
//! ```no_run
//! use framecheck::CheckExt as _;
//! use polars::prelude::*;
//!
//! # fn main() -> framecheck::error::Result<()> {
//! let df = df!("a" => &[Some(1), Some(2), None], "b" => &[3, 4, 5])?;
//!
//! let rows = df
//!     .check().shape()?
//!     .check().nnulls()?
//!     .check().subset(["b"]).describe()?
//!     .check().assert_data(col("b").gt(lit(0)))?
//!     .height();
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`checks`]: The check executor and the catalog of operations
//! - [`config`]: Process-wide switch and presentation options
//! - [`stopwatch`]: Timing stretches of a pipeline
//! - [`export`]: File formats for the `write` check
//! - [`surface`]: Where check output goes
//! - [`plot`]: Plot backends for `hist` and `plot`
//! - [`error`]: Error types and handling utilities
//! - [`logging`]: `tracing` subscriber setup for applications
//!
//! ## Turning Checks Off
//!
//! Checks are meant to stay in production code. Set `FRAMECHECK_ENABLED=0` or
//! call [`config::disable`] and every check returns its input untouched
//! without computing anything, assertions included.

pub mod checks;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod plot;
pub mod stopwatch;
pub mod surface;

pub use checks::condition::Condition;
pub use checks::operation::{DescribeOptions, NullOptions, Operation};
pub use checks::stats::DuplicateKeep;
pub use checks::{AssertOptions, CheckExt, Checks, Tabular, WriteOptions};
pub use config::Settings;
pub use error::{CheckError, Result};
pub use stopwatch::Stopwatch;
