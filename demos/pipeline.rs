//! A small cleaning pipeline with checks between the steps.
//!
//! Run with `cargo run --example pipeline`; set `FRAMECHECK_ENABLED=0` to see
//! the same pipeline with every check switched off.

use anyhow::Result;
use framecheck::{CheckExt as _, Condition, Stopwatch, config, logging};
use polars::prelude::*;

fn main() -> Result<()> {
    logging::init()?;
    let watch = Stopwatch::start();

    let orders = df!(
        "city" => &["Oslo", "Rome", "Oslo", "Lima", "Rome", "Rome"],
        "amount" => &[Some(12.5), Some(7.25), None, Some(31.0), Some(7.25), Some(18.0)],
        "items" => &[1, 3, 2, 4, 3, 2]
    )?;

    config::set_format([("precision", 2)])?;

    let cleaned = orders
        .check().shape()?
        .check().nnulls()?
        .check().subset(["city", "items"]).ndups()?
        .filter(&orders.column("amount")?.is_not_null())?;

    let by_city = cleaned
        .check().describe()?
        .check().value_counts("city", 0)?
        .check().subset(["amount"]).hist()?
        .check()
        .assert_data(Condition::expr(col("amount").gt(lit(0))).described("amounts are positive"))?
        .clone()
        .lazy()
        .group_by([col("city")])
        .agg([col("amount").sum()])
        .sort(["city"], Default::default())
        .collect()?;

    let dir = std::env::temp_dir().join("framecheck-demo");
    by_city
        .check().name("Totals by city").print()?
        .check().write(dir.join("totals.csv"))?
        .check().time_elapsed(&watch, "auto")?;

    config::reset_format();
    Ok(())
}
