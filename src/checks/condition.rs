//! Conditions evaluated by `assert_data`.

use polars::prelude::*;
use std::fmt;

type Predicate<'a> = Box<dyn Fn(&DataFrame) -> PolarsResult<bool> + 'a>;

enum Test<'a> {
    Expr(Expr),
    Predicate(Predicate<'a>),
}

/// A data-quality condition over a check's view.
///
/// An expression holds when it evaluates to `true` for every row it produces
/// (an aggregate produces one row). Nulls count as `false`. A predicate is an
/// arbitrary closure over the view.
///
/// ```
/// use framecheck::Condition;
/// use polars::prelude::*;
///
/// let positive = Condition::expr(col("price").gt(lit(0)));
/// let small = Condition::predicate(|df: &DataFrame| Ok(df.height() < 1_000))
///     .described("fewer than 1000 rows");
/// ```
pub struct Condition<'a> {
    test: Test<'a>,
    description: Option<String>,
}

impl<'a> Condition<'a> {
    pub fn expr(expr: Expr) -> Self {
        Self {
            test: Test::Expr(expr),
            description: None,
        }
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&DataFrame) -> PolarsResult<bool> + 'a,
    {
        Self {
            test: Test::Predicate(Box::new(f)),
            description: None,
        }
    }

    /// Replaces the text shown alongside pass and fail messages.
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn description(&self) -> String {
        match (&self.description, &self.test) {
            (Some(text), _) => text.clone(),
            (None, Test::Expr(expr)) => format!("{expr:?}"),
            (None, Test::Predicate(_)) => "custom predicate".to_owned(),
        }
    }

    /// Evaluates the condition.
    ///
    /// # Errors
    ///
    /// Polars errors from evaluating the expression or predicate, including a
    /// schema mismatch when an expression does not produce booleans.
    pub fn holds(&self, view: &DataFrame) -> PolarsResult<bool> {
        match &self.test {
            Test::Predicate(f) => f(view),
            Test::Expr(expr) => {
                let out = view
                    .clone()
                    .lazy()
                    .select([expr.clone().alias("condition")])
                    .collect()?;
                let Some(column) = out.get_columns().first() else {
                    return Ok(true);
                };
                let mask = column.as_materialized_series().bool()?;
                Ok(mask.null_count() == 0 && mask.all())
            }
        }
    }
}

impl From<Expr> for Condition<'_> {
    fn from(expr: Expr) -> Self {
        Self::expr(expr)
    }
}

impl fmt::Debug for Condition<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("description", &self.description())
            .finish()
    }
}
