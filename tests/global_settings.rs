//! Tests for the process-wide settings store
//!
//! Every test here mutates global state, so they take a shared lock and
//! restore the factory settings before releasing it.

use anyhow::Result;
use framecheck::config::{self, OptionValue};
use framecheck::surface::Buffer;
use framecheck::{CheckError, CheckExt as _, Condition, Settings};
use polars::prelude::*;
use std::sync::{Mutex, MutexGuard, PoisonError};

static LOCK: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    let guard = LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    config::reset_format();
    config::enable();
    guard
}

#[test]
fn test_set_and_reset_precision() -> Result<()> {
    let _guard = serial();

    config::set_format([("precision", 7)])?;
    assert_eq!(config::current().precision, 7);

    config::reset_format();
    assert_eq!(config::current().precision, Settings::DEFAULT_PRECISION);
    Ok(())
}

#[test]
fn test_unknown_option_changes_nothing() {
    let _guard = serial();

    let result = config::set_format([
        ("precision", OptionValue::from(9)),
        ("colour", OptionValue::from("red")),
    ]);
    assert!(matches!(result, Err(CheckError::Config(_))), "{result:?}");
    assert_eq!(
        config::current().precision,
        Settings::DEFAULT_PRECISION,
        "a rejected batch must not be partially applied"
    );
}

#[test]
fn test_wrong_value_type() {
    let _guard = serial();
    assert!(config::set_format([("framecheck.use_emojis", 1)]).is_err());
    assert!(config::set_format([("precision", -1)]).is_err());
}

#[test]
fn test_reset_keeps_enabled_flag() {
    let _guard = serial();

    config::disable();
    config::reset_format();
    assert!(!config::is_enabled(), "reset_format must not re-enable checks");
    config::enable();
}

#[test]
fn test_global_disable_skips_checks() -> Result<()> {
    let _guard = serial();
    let df = df!("a" => &[1, 2, 3])?;
    let buffer = Buffer::new();

    config::disable();
    let result = df
        .check()
        .surface(&buffer)
        .assert_data(Condition::predicate(|_| Ok(false)));
    config::enable();

    assert!(result.is_ok(), "disabled assertion must pass");
    assert!(buffer.is_empty(), "disabled check emitted output");
    Ok(())
}

#[test]
fn test_chain_level_format() -> Result<()> {
    let _guard = serial();
    let df = df!("x" => &[1.0 / 3.0])?;
    let buffer = Buffer::new();

    df.check()
        .set_format([("precision", OptionValue::from(2)), ("use_emojis", OptionValue::from(false))])?
        .check()
        .surface(&buffer)
        .name("Mean")
        .evaluate(|d| {
            let mean = d.column("x")?.as_materialized_series().mean().unwrap_or(f64::NAN);
            Ok(mean)
        })?
        .check()
        .reset_format();

    assert_eq!(buffer.contents(), "Mean: 0.33");
    assert_eq!(config::current(), Settings::default());
    Ok(())
}

#[test]
fn test_load_format_from_json() -> Result<()> {
    let _guard = serial();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("checks.json");
    std::fs::write(
        &path,
        r#"{"framecheck.precision": 4, "indent_multiline": true}"#,
    )?;

    config::load_format(&path)?;
    let settings = config::current();
    assert_eq!(settings.precision, 4);
    assert!(settings.indent_multiline);

    std::fs::write(&path, "[1, 2]")?;
    assert!(matches!(config::load_format(&path), Err(CheckError::Config(_))));

    config::reset_format();
    Ok(())
}
