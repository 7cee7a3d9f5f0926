//! Aggregates: expressions reducing their scope to a single value.

use std::any::Any;
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use tabula_array::Column;
use tabula_array::aliases::hash_set::HashSet;
use tabula_array::compute::{compare_rows, filter, kleene_and, kleene_or};
use tabula_dtype::DType;
use tabula_error::{TabulaResult, tabula_bail};
use tabula_scalar::Scalar;

use crate::{ExprKind, ExprRef, Scope, TabulaExpr};

/// The reduction an [`Aggregate`] applies.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AggregateFunction {
    /// Number of rows in scope.
    Count,
    Sum,
    Mean,
    Median,
    /// Sample variance, with an `n - 1` denominator.
    Var,
    /// Sample standard deviation.
    Sd,
    Min,
    Max,
    First,
    Last,
    /// The value at a 1-based position; negative positions count from the end.
    Nth(i64),
    NDistinct,
    Any,
    All,
}

impl AggregateFunction {
    fn name(self) -> &'static str {
        match self {
            Self::Count => "n",
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Var => "var",
            Self::Sd => "sd",
            Self::Min => "min",
            Self::Max => "max",
            Self::First => "first",
            Self::Last => "last",
            Self::Nth(_) => "nth",
            Self::NDistinct => "n_distinct",
            Self::Any => "any",
            Self::All => "all",
        }
    }

    /// Whether a missing input makes the result missing.
    fn propagates_missing(self) -> bool {
        matches!(
            self,
            Self::Sum | Self::Mean | Self::Median | Self::Var | Self::Sd | Self::Min | Self::Max
        )
    }
}

/// An aggregate over one argument, or over the scope itself for [`n`].
///
/// Missing inputs are not skipped unless the aggregate is built with
/// [`Aggregate::skip_missing`].
#[derive(Debug, Clone, Eq)]
pub struct Aggregate {
    function: AggregateFunction,
    child: Option<ExprRef>,
    skip_missing: bool,
}

impl Aggregate {
    pub fn new(function: AggregateFunction, child: Option<ExprRef>) -> Self {
        Self {
            function,
            child,
            skip_missing: false,
        }
    }

    /// Drop missing values before reducing.
    pub fn skip_missing(mut self) -> Self {
        self.skip_missing = true;
        self
    }

    pub fn function(&self) -> AggregateFunction {
        self.function
    }

    fn reduce(&self, column: &Column) -> TabulaResult<Scalar> {
        let function = self.function;
        check_input(function, column.dtype())?;
        let column = if self.skip_missing && column.null_count() > 0 {
            filter(column, &column.validity().to_mask(column.len()))?
        } else {
            column.clone()
        };
        let output = output_dtype(function, column.dtype());
        if function.propagates_missing() && column.null_count() > 0 {
            return Ok(Scalar::null(output));
        }

        let len = column.len();
        Ok(match function {
            AggregateFunction::Count => Scalar::integer(len as i64),
            AggregateFunction::Sum => match column.dtype() {
                DType::Integer => column
                    .i64_iter()?
                    .flatten()
                    .try_fold(0i64, i64::checked_add)
                    .into(),
                _ => Scalar::real(column.f64_iter()?.flatten().sum()),
            },
            AggregateFunction::Mean => {
                Scalar::real(column.f64_iter()?.flatten().sum::<f64>() / len as f64)
            }
            AggregateFunction::Median => {
                median_value(column.f64_iter()?.flatten().collect()).into()
            }
            AggregateFunction::Var => variance(&column.f64_iter()?.flatten().collect_vec()).into(),
            AggregateFunction::Sd => variance(&column.f64_iter()?.flatten().collect_vec())
                .map(f64::sqrt)
                .into(),
            AggregateFunction::Min | AggregateFunction::Max => extreme(function, &column)?,
            AggregateFunction::First => position(&column, 0),
            AggregateFunction::Last => match len.checked_sub(1) {
                Some(idx) => position(&column, idx),
                None => Scalar::null(output),
            },
            AggregateFunction::Nth(n) => {
                let idx = match n {
                    0 => tabula_bail!("nth positions are 1-based, got 0"),
                    n if n > 0 => usize::try_from(n - 1).ok(),
                    n => usize::try_from(len as i64 + n).ok(),
                };
                match idx {
                    Some(idx) => position(&column, idx),
                    None => Scalar::null(output),
                }
            }
            AggregateFunction::NDistinct => {
                let distinct: HashSet<Scalar> = column.scalars().collect();
                Scalar::integer(distinct.len() as i64)
            }
            AggregateFunction::Any => column
                .bool_iter()?
                .fold(Some(false), kleene_or)
                .into(),
            AggregateFunction::All => column.bool_iter()?.fold(Some(true), kleene_and).into(),
        })
    }
}

fn check_input(function: AggregateFunction, dtype: DType) -> TabulaResult<()> {
    let accepted = match function {
        AggregateFunction::Sum
        | AggregateFunction::Mean
        | AggregateFunction::Median
        | AggregateFunction::Var
        | AggregateFunction::Sd => dtype.is_numeric(),
        AggregateFunction::Any | AggregateFunction::All => dtype == DType::Bool,
        _ => true,
    };
    if !accepted {
        tabula_bail!(Schema: "cannot compute {} of a {} column", function.name(), dtype);
    }
    Ok(())
}

fn output_dtype(function: AggregateFunction, input: DType) -> DType {
    match function {
        AggregateFunction::Count | AggregateFunction::NDistinct => DType::Integer,
        AggregateFunction::Sum => input,
        AggregateFunction::Mean
        | AggregateFunction::Median
        | AggregateFunction::Var
        | AggregateFunction::Sd => DType::Real,
        AggregateFunction::Any | AggregateFunction::All => DType::Bool,
        _ => input,
    }
}

fn position(column: &Column, idx: usize) -> Scalar {
    if idx < column.len() {
        column.scalar_at(idx)
    } else {
        Scalar::null(column.dtype())
    }
}

fn median_value(mut values: Vec<f64>) -> Option<f64> {
    if values.iter().any(|v| v.is_nan()) {
        return Some(f64::NAN);
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    match values.len() {
        0 => None,
        n if n % 2 == 1 => Some(values[mid]),
        _ => Some((values[mid - 1] + values[mid]) / 2.0),
    }
}

fn variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    Some(values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0))
}

/// The smallest or largest present value; `NaN` wins either way.
fn extreme(function: AggregateFunction, column: &Column) -> TabulaResult<Scalar> {
    if column.dtype() == DType::Real && column.f64_iter()?.flatten().any(|v| v.is_nan()) {
        return Ok(Scalar::real(f64::NAN));
    }
    let rows = 0..column.len();
    let idx = match function {
        AggregateFunction::Min => rows.min_by(|&a, &b| compare_rows(column, a, b, false)),
        _ => rows.max_by(|&a, &b| compare_rows(column, a, b, false)),
    };
    Ok(match idx {
        Some(idx) => column.scalar_at(idx),
        None => Scalar::null(column.dtype()),
    })
}

impl PartialEq for Aggregate {
    fn eq(&self, other: &Aggregate) -> bool {
        self.function == other.function
            && self.skip_missing == other.skip_missing
            && match (&self.child, &other.child) {
                (Some(a), Some(b)) => a.eq(b),
                (None, None) => true,
                _ => false,
            }
    }
}

impl Display for Aggregate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut args = Vec::with_capacity(3);
        if let Some(child) = &self.child {
            args.push(child.to_string());
        }
        if let AggregateFunction::Nth(n) = self.function {
            args.push(n.to_string());
        }
        if self.skip_missing {
            args.push("skip_missing".to_string());
        }
        write!(f, "{}({})", self.function.name(), args.iter().format(", "))
    }
}

impl TabulaExpr for Aggregate {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn evaluate(&self, scope: &Scope<'_>) -> TabulaResult<Column> {
        let value = match &self.child {
            None => Scalar::integer(scope.len() as i64),
            Some(child) => self.reduce(&child.evaluate(scope)?)?,
        };
        Ok(Column::constant(&value, 1))
    }

    fn children(&self) -> Vec<&ExprRef> {
        self.child.iter().collect()
    }

    fn kind(&self) -> ExprKind {
        ExprKind::Aggregate
    }
}

impl From<Aggregate> for ExprRef {
    fn from(value: Aggregate) -> Self {
        std::sync::Arc::new(value)
    }
}

/// The number of rows in scope.
pub fn n() -> Aggregate {
    Aggregate::new(AggregateFunction::Count, None)
}

/// Sum of a numeric column; Integer sums stay Integer and overflow to missing.
pub fn sum(child: impl Into<ExprRef>) -> Aggregate {
    Aggregate::new(AggregateFunction::Sum, Some(child.into()))
}

/// Arithmetic mean; `NaN` for an empty input.
pub fn mean(child: impl Into<ExprRef>) -> Aggregate {
    Aggregate::new(AggregateFunction::Mean, Some(child.into()))
}

pub fn median(child: impl Into<ExprRef>) -> Aggregate {
    Aggregate::new(AggregateFunction::Median, Some(child.into()))
}

pub fn var(child: impl Into<ExprRef>) -> Aggregate {
    Aggregate::new(AggregateFunction::Var, Some(child.into()))
}

pub fn sd(child: impl Into<ExprRef>) -> Aggregate {
    Aggregate::new(AggregateFunction::Sd, Some(child.into()))
}

pub fn min(child: impl Into<ExprRef>) -> Aggregate {
    Aggregate::new(AggregateFunction::Min, Some(child.into()))
}

pub fn max(child: impl Into<ExprRef>) -> Aggregate {
    Aggregate::new(AggregateFunction::Max, Some(child.into()))
}

pub fn first(child: impl Into<ExprRef>) -> Aggregate {
    Aggregate::new(AggregateFunction::First, Some(child.into()))
}

pub fn last(child: impl Into<ExprRef>) -> Aggregate {
    Aggregate::new(AggregateFunction::Last, Some(child.into()))
}

/// The value at 1-based position `n`, counting from the end when `n` is negative. Positions
/// outside the scope give a missing value; position 0 is an invalid argument.
pub fn nth(child: impl Into<ExprRef>, n: i64) -> Aggregate {
    Aggregate::new(AggregateFunction::Nth(n), Some(child.into()))
}

/// Number of distinct values, counting missing as one value.
pub fn n_distinct(child: impl Into<ExprRef>) -> Aggregate {
    Aggregate::new(AggregateFunction::NDistinct, Some(child.into()))
}

pub fn any(child: impl Into<ExprRef>) -> Aggregate {
    Aggregate::new(AggregateFunction::Any, Some(child.into()))
}

pub fn all(child: impl Into<ExprRef>) -> Aggregate {
    Aggregate::new(AggregateFunction::All, Some(child.into()))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tabula_array::Table;
    use tabula_error::ErrorKind;

    use super::*;
    use crate::col;

    fn table() -> Table {
        Table::try_from_columns([
            ("i", Column::from(vec![Some(3i64), None, Some(1), Some(4)])),
            ("r", Column::from(vec![1.0, 2.0, 3.0, 6.0])),
            ("s", Column::from(vec![Some("b"), Some("a"), None, Some("b")])),
            ("b", Column::from(vec![Some(false), None, Some(true), Some(false)])),
        ])
        .unwrap()
    }

    fn eval(agg: Aggregate) -> TabulaResult<Scalar> {
        let table = table();
        let expr: ExprRef = agg.into();
        let result = expr.evaluate(&Scope::new(&table))?;
        assert_eq!(result.len(), 1);
        Ok(result.scalar_at(0))
    }

    #[rstest]
    #[case(n(), Scalar::integer(4))]
    #[case(sum(col("i")), Scalar::null(DType::Integer))]
    #[case(sum(col("i")).skip_missing(), Scalar::integer(8))]
    #[case(sum(col("r")), Scalar::real(12.0))]
    #[case(mean(col("r")), Scalar::real(3.0))]
    #[case(median(col("r")), Scalar::real(2.5))]
    #[case(var(col("r")), Scalar::real(14.0 / 3.0))]
    #[case(min(col("i")).skip_missing(), Scalar::integer(1))]
    #[case(max(col("s")).skip_missing(), Scalar::text("b"))]
    #[case(max(col("s")), Scalar::null(DType::Text))]
    #[case(first(col("s")), Scalar::text("b"))]
    #[case(last(col("i")), Scalar::integer(4))]
    #[case(nth(col("i"), 2), Scalar::null(DType::Integer))]
    #[case(nth(col("i"), 2).skip_missing(), Scalar::integer(1))]
    #[case(nth(col("i"), -1), Scalar::integer(4))]
    #[case(nth(col("i"), 9), Scalar::null(DType::Integer))]
    #[case(n_distinct(col("s")), Scalar::integer(3))]
    #[case(n_distinct(col("s")).skip_missing(), Scalar::integer(2))]
    #[case(any(col("b")), Scalar::bool(true))]
    #[case(all(col("b")), Scalar::bool(false))]
    fn reductions(#[case] agg: Aggregate, #[case] expected: Scalar) {
        assert_eq!(eval(agg).unwrap(), expected);
    }

    #[test]
    fn kleene_any_all() {
        let table = Table::try_from_columns([(
            "b",
            Column::from(vec![Some(false), None]),
        )])
        .unwrap();
        let scope = Scope::new(&table);
        let eval = |agg: Aggregate| ExprRef::from(agg).evaluate(&scope).unwrap().scalar_at(0);
        assert_eq!(eval(any(col("b"))), Scalar::null(DType::Bool));
        assert_eq!(eval(all(col("b"))), Scalar::bool(false));
        assert_eq!(eval(any(col("b")).skip_missing()), Scalar::bool(false));
    }

    #[test]
    fn empty_scope() {
        let table = table();
        let rows: [usize; 0] = [];
        let scope = Scope::for_rows(&table, &rows);
        let eval = |agg: Aggregate| ExprRef::from(agg).evaluate(&scope).unwrap().scalar_at(0);
        assert_eq!(eval(n()), Scalar::integer(0));
        assert_eq!(eval(sum(col("i"))), Scalar::integer(0));
        assert!(eval(mean(col("r"))).as_f64().unwrap().is_nan());
        assert_eq!(eval(median(col("r"))), Scalar::null(DType::Real));
        assert_eq!(eval(max(col("i"))), Scalar::null(DType::Integer));
        assert_eq!(eval(sd(col("r"))), Scalar::null(DType::Real));
        assert_eq!(eval(any(col("b")).skip_missing()), Scalar::bool(false));
        assert_eq!(eval(all(col("b")).skip_missing()), Scalar::bool(true));
    }

    #[test]
    fn nan_propagates_through_min_max() {
        let table =
            Table::try_from_columns([("r", Column::from(vec![1.0, f64::NAN, -1.0]))]).unwrap();
        let result = ExprRef::from(min(col("r")))
            .evaluate(&Scope::new(&table))
            .unwrap();
        assert!(result.scalar_at(0).as_f64().unwrap().is_nan());
    }

    #[test]
    fn integer_overflow_is_missing() {
        let table =
            Table::try_from_columns([("i", Column::from(vec![i64::MAX, 1]))]).unwrap();
        let result = ExprRef::from(sum(col("i")))
            .evaluate(&Scope::new(&table))
            .unwrap();
        assert!(result.scalar_at(0).is_null());
    }

    #[test]
    fn errors() {
        assert_eq!(eval(nth(col("i"), 0)).unwrap_err().kind(), ErrorKind::InvalidArgument);
        assert_eq!(eval(mean(col("s"))).unwrap_err().kind(), ErrorKind::Schema);
        assert_eq!(eval(any(col("i"))).unwrap_err().kind(), ErrorKind::Schema);
    }

    #[test]
    fn display() {
        assert_eq!(n().to_string(), "n()");
        assert_eq!(nth(col("x"), 2).skip_missing().to_string(), "nth(x, 2, skip_missing)");
    }
}
