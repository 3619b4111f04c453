//! Integration tests for check chains
//!
//! These run whole pipelines through the public API and verify that checks
//! observe the data without ever changing what flows through the chain.

use anyhow::Result;
use framecheck::surface::Buffer;
use framecheck::{
    AssertOptions, CheckError, CheckExt as _, Condition, NullOptions, Settings, Stopwatch,
};
use polars::prelude::*;
use std::cell::Cell;

fn sample() -> PolarsResult<DataFrame> {
    df!(
        "a" => &[Some(1), Some(2), None],
        "b" => &[3, 4, 5]
    )
}

fn on() -> Settings {
    Settings {
        enabled: true,
        use_emojis: false,
        ..Settings::default()
    }
}

#[test]
fn test_long_chain_is_non_invasive() -> Result<()> {
    let df = sample()?;
    let before = df.clone();
    let buffer = Buffer::new();

    let out = df
        .check().surface(&buffer).settings(on()).describe()?
        .check().surface(&buffer).settings(on()).dtypes()?
        .check().surface(&buffer).settings(on()).info()?
        .check().surface(&buffer).settings(on()).memory_usage()?
        .check().surface(&buffer).settings(on()).head(2)?
        .check().surface(&buffer).settings(on()).tail(2)?
        .check().surface(&buffer).settings(on()).ndups()?
        .check().surface(&buffer).settings(on()).nnulls()?
        .check().surface(&buffer).settings(on()).value_counts("b", 0)?
        .check().surface(&buffer).settings(on()).unique("b")?
        .check().surface(&buffer).settings(on()).hist()?
        .check().surface(&buffer).settings(on()).plot()?;

    assert!(std::ptr::eq(out, &df), "chain must hand back the input");
    assert!(out.equals_missing(&before), "chain must not change the data");
    assert_eq!(buffer.len(), 12, "one emission per check");
    Ok(())
}

#[test]
fn test_null_table_and_sum_gate() -> Result<()> {
    let df = sample()?;
    let buffer = Buffer::new();

    let out = df
        .check().surface(&buffer).settings(on()).nnulls()?
        .check().surface(&buffer).settings(on()).assert_data(col("b").sum().eq(lit(12)))?;

    assert!(std::ptr::eq(out, &df), "chain must hand back the input");
    assert_eq!(out.shape(), (3, 2));

    let expected = df!(
        "column" => &["a", "b"],
        "nulls" => &[1_u64, 0]
    )?;
    assert_eq!(buffer.contents(), format!("Rows with nulls\n{expected}"));

    let err = df
        .check()
        .settings(on())
        .assert_data(col("b").sum().eq(lit(13)))
        .err();
    assert!(
        err.as_ref().is_some_and(CheckError::is_validation),
        "expected validation error, got {err:?}"
    );
    Ok(())
}

#[test]
fn test_null_checks_on_sample() -> Result<()> {
    let df = sample()?;
    let buffer = Buffer::new();

    df.check()
        .surface(&buffer)
        .settings(on())
        .nnulls_with(NullOptions { by_column: false })?;
    assert_eq!(buffer.contents(), "Rows with nulls: 1 out of 3");

    buffer.clear();
    df.check()
        .surface(&buffer)
        .settings(on())
        .subset(["b"])
        .nnulls_with(NullOptions { by_column: false })?;
    assert_eq!(buffer.contents(), "Rows with nulls in [b]: 0 out of 3");
    Ok(())
}

#[test]
fn test_disabled_checks_compute_nothing() -> Result<()> {
    let df = sample()?;
    let buffer = Buffer::new();
    let projections = Cell::new(0);
    let predicates = Cell::new(0);
    let off = Settings::default().disabled();

    let out = df
        .check()
        .surface(&buffer)
        .settings(off)
        .map(|d| {
            projections.set(projections.get() + 1);
            Ok(d.clone())
        })
        .describe()?
        .check()
        .settings(off)
        .assert_data(Condition::predicate(|_| {
            predicates.set(predicates.get() + 1);
            Ok(false)
        }))?;

    assert!(std::ptr::eq(out, &df), "disabled chain must hand back the input");
    assert_eq!(projections.get(), 0, "projection ran while disabled");
    assert_eq!(predicates.get(), 0, "predicate ran while disabled");
    assert!(buffer.is_empty(), "disabled check emitted output");
    Ok(())
}

#[test]
fn test_assertion_stops_chain() -> Result<()> {
    let df = sample()?;
    let reached = Cell::new(false);

    let result = df
        .check()
        .settings(on())
        .assert_data(col("a").is_not_null().all(false))
        .map(|d| {
            reached.set(true);
            d.height()
        });

    let err = result.err();
    assert!(
        err.as_ref().is_some_and(CheckError::is_validation),
        "expected validation error, got {err:?}"
    );
    assert!(!reached.get(), "chain continued past a failed assertion");
    Ok(())
}

#[test]
fn test_assertion_on_projected_view() -> Result<()> {
    let df = sample()?;
    let out = df
        .check()
        .settings(on())
        .map(|d| d.filter(&d.column("a")?.is_not_null()))
        .assert_data(col("a").is_not_null().all(false))?;
    assert_eq!(out.column("a")?.null_count(), 1, "input must keep its nulls");
    Ok(())
}

#[test]
fn test_soft_assertion_keeps_going() -> Result<()> {
    let df = sample()?;
    let buffer = Buffer::new();
    let options = AssertOptions {
        raise: false,
        fail_message: "Sum check".to_owned(),
        ..AssertOptions::default()
    };

    let out = df
        .check()
        .surface(&buffer)
        .settings(on())
        .assert_data_with(
            Condition::expr(col("b").sum().eq(lit(100))).described("b sums to 100"),
            options,
        )?;
    assert!(std::ptr::eq(out, &df), "soft assertion must hand back the input");
    assert_eq!(buffer.contents(), "Sum check: b sums to 100");
    Ok(())
}

#[test]
fn test_series_flows_through_checks() -> Result<()> {
    let s = Series::new("price".into(), &[10.0, 12.5, 11.25]);
    let buffer = Buffer::new();

    let out = s
        .check().surface(&buffer).settings(on()).describe()?
        .check().surface(&buffer).settings(on()).nunique("price")?;
    assert!(std::ptr::eq(out, &s), "series chain must hand back the input");

    let blocks = buffer.blocks();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks.last().map(String::as_str), Some("Unique values in price: 3"));
    Ok(())
}

#[test]
fn test_export_and_read_back() -> Result<()> {
    let df = sample()?;
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("sample.parquet");

    df.check().settings(on()).write(&path)?;

    let file = std::fs::File::open(&path)?;
    let back = ParquetReader::new(file).finish()?;
    assert!(back.equals_missing(&df), "parquet export must round-trip");
    Ok(())
}

#[test]
fn test_timed_pipeline() -> Result<()> {
    let df = sample()?;
    let watch = Stopwatch::start();
    let buffer = Buffer::new();

    df.check()
        .surface(&buffer)
        .settings(on())
        .name("Load")
        .time_elapsed(&watch, "ms")?;
    let out = buffer.contents();
    assert!(out.starts_with("Load: "), "{out}");
    assert!(out.ends_with(" milliseconds"), "{out}");
    Ok(())
}
