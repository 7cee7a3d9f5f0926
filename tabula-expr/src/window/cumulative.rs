use std::any::Any;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use tabula_array::Column;
use tabula_array::compute::{kleene_and, kleene_or};
use tabula_dtype::DType;
use tabula_error::{TabulaResult, tabula_bail};

use crate::window::evaluate_argument;
use crate::{ExprKind, ExprRef, Scope, TabulaExpr};

/// The running folds.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CumulativeFunction {
    Sum,
    Prod,
    Min,
    Max,
    Mean,
    All,
    Any,
}

impl CumulativeFunction {
    fn name(self) -> &'static str {
        match self {
            Self::Sum => "cumsum",
            Self::Prod => "cumprod",
            Self::Min => "cummin",
            Self::Max => "cummax",
            Self::Mean => "cummean",
            Self::All => "cumall",
            Self::Any => "cumany",
        }
    }
}

/// A running fold over the rows of the scope, in row order.
///
/// By default a missing input makes its output and every later output missing. With
/// [`Cumulative::skip_missing`] a missing input yields a missing output and the fold carries on.
#[derive(Debug, Clone, Eq)]
pub struct Cumulative {
    function: CumulativeFunction,
    child: ExprRef,
    skip_missing: bool,
}

impl Cumulative {
    pub fn new(function: CumulativeFunction, child: ExprRef) -> Self {
        Self {
            function,
            child,
            skip_missing: false,
        }
    }

    pub fn skip_missing(mut self) -> Self {
        self.skip_missing = true;
        self
    }

    fn fold(&self, values: &Column) -> TabulaResult<Column> {
        let skip = self.skip_missing;
        let dtype = values.dtype();
        match (self.function, dtype) {
            (CumulativeFunction::All | CumulativeFunction::Any, DType::Bool) => {
                Ok(self.kleene(values.bool_iter()?))
            }
            (CumulativeFunction::All | CumulativeFunction::Any, _) => {
                tabula_bail!(
                    Schema: "{} needs a bool column, found {}",
                    self.function.name(),
                    dtype
                )
            }
            (_, dtype) if !dtype.is_numeric() => {
                tabula_bail!(
                    Schema: "{} needs a numeric column, found {}",
                    self.function.name(),
                    dtype
                )
            }
            (CumulativeFunction::Sum, DType::Integer) => Ok(running(
                values.i64_iter()?,
                skip,
                |acc: Option<&i64>, v| acc.map_or(Some(v), |acc| acc.checked_add(v)),
            )
            .into_iter()
            .collect()),
            (CumulativeFunction::Min, DType::Integer) => Ok(running(
                values.i64_iter()?,
                skip,
                |acc: Option<&i64>, v| Some(acc.map_or(v, |&acc| acc.min(v))),
            )
            .into_iter()
            .collect()),
            (CumulativeFunction::Max, DType::Integer) => Ok(running(
                values.i64_iter()?,
                skip,
                |acc: Option<&i64>, v| Some(acc.map_or(v, |&acc| acc.max(v))),
            )
            .into_iter()
            .collect()),
            (CumulativeFunction::Mean, _) => Ok(running(
                values.f64_iter()?,
                skip,
                |acc: Option<&(f64, f64)>, v| {
                    let (sum, count) = acc.copied().unwrap_or((0.0, 0.0));
                    Some((sum + v, count + 1.0))
                },
            )
            .into_iter()
            .map(|acc| acc.map(|(sum, count)| sum / count))
            .collect()),
            (function, _) => Ok(running(values.f64_iter()?, skip, |acc: Option<&f64>, v| {
                let Some(&acc) = acc else {
                    return Some(v);
                };
                Some(match function {
                    CumulativeFunction::Sum => acc + v,
                    CumulativeFunction::Prod => acc * v,
                    CumulativeFunction::Min if acc.is_nan() || v.is_nan() => f64::NAN,
                    CumulativeFunction::Min => acc.min(v),
                    CumulativeFunction::Max if acc.is_nan() || v.is_nan() => f64::NAN,
                    _ => acc.max(v),
                })
            })
            .into_iter()
            .collect()),
        }
    }

    fn kleene(&self, values: impl Iterator<Item = Option<bool>>) -> Column {
        let (mut acc, combine): (Option<bool>, fn(Option<bool>, Option<bool>) -> Option<bool>) =
            match self.function {
                CumulativeFunction::Any => (Some(false), kleene_or),
                _ => (Some(true), kleene_and),
            };
        values
            .map(|value| {
                if value.is_none() && self.skip_missing {
                    return None;
                }
                acc = combine(acc, value);
                acc
            })
            .collect()
    }
}

/// Fold `values` in order, emitting the running state.
///
/// `step` receives the state so far (`None` before the first value) and returns `None` when
/// the fold cannot continue, after which every output is missing.
fn running<T, S: Clone>(
    values: impl Iterator<Item = Option<T>>,
    skip_missing: bool,
    mut step: impl FnMut(Option<&S>, T) -> Option<S>,
) -> Vec<Option<S>> {
    let mut state: Option<S> = None;
    let mut poisoned = false;
    values
        .map(|value| {
            if poisoned {
                return None;
            }
            match value {
                None => {
                    poisoned = !skip_missing;
                    None
                }
                Some(v) => {
                    state = step(state.as_ref(), v);
                    poisoned = state.is_none();
                    state.clone()
                }
            }
        })
        .collect()
}

impl PartialEq for Cumulative {
    fn eq(&self, other: &Cumulative) -> bool {
        self.function == other.function
            && self.skip_missing == other.skip_missing
            && self.child.eq(&other.child)
    }
}

impl Display for Cumulative {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({}", self.function.name(), self.child)?;
        if self.skip_missing {
            write!(f, ", skip_missing")?;
        }
        write!(f, ")")
    }
}

impl TabulaExpr for Cumulative {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn evaluate(&self, scope: &Scope<'_>) -> TabulaResult<Column> {
        let values = evaluate_argument(self.function.name(), &self.child, scope)?;
        self.fold(&values)
    }

    fn children(&self) -> Vec<&ExprRef> {
        vec![&self.child]
    }

    fn kind(&self) -> ExprKind {
        ExprKind::Window
    }
}

impl From<Cumulative> for ExprRef {
    fn from(value: Cumulative) -> Self {
        Arc::new(value)
    }
}

/// Running sum; Integer input stays Integer, and an overflow is missing from then on.
pub fn cumsum(child: impl Into<ExprRef>) -> Cumulative {
    Cumulative::new(CumulativeFunction::Sum, child.into())
}

/// Running product, always Real.
pub fn cumprod(child: impl Into<ExprRef>) -> Cumulative {
    Cumulative::new(CumulativeFunction::Prod, child.into())
}

pub fn cummin(child: impl Into<ExprRef>) -> Cumulative {
    Cumulative::new(CumulativeFunction::Min, child.into())
}

pub fn cummax(child: impl Into<ExprRef>) -> Cumulative {
    Cumulative::new(CumulativeFunction::Max, child.into())
}

/// Running mean, always Real.
pub fn cummean(child: impl Into<ExprRef>) -> Cumulative {
    Cumulative::new(CumulativeFunction::Mean, child.into())
}

/// Running Kleene conjunction.
pub fn cumall(child: impl Into<ExprRef>) -> Cumulative {
    Cumulative::new(CumulativeFunction::All, child.into())
}

/// Running Kleene disjunction.
pub fn cumany(child: impl Into<ExprRef>) -> Cumulative {
    Cumulative::new(CumulativeFunction::Any, child.into())
}

#[cfg(test)]
mod tests {
    use tabula_array::Table;
    use tabula_error::ErrorKind;

    use super::*;
    use crate::col;

    fn table() -> Table {
        Table::try_from_columns([
            ("i", Column::from(vec![Some(3i64), Some(1), None, Some(5)])),
            ("r", Column::from(vec![2.0, 0.5, 4.0, 1.0])),
            ("b", Column::from(vec![Some(true), None, Some(false), Some(true)])),
            ("s", Column::from(vec!["a", "b", "c", "d"])),
        ])
        .unwrap()
    }

    fn eval(expr: Cumulative) -> TabulaResult<Column> {
        let table = table();
        ExprRef::from(expr).evaluate(&Scope::new(&table))
    }

    #[test]
    fn missing_poisons_by_default() {
        assert_eq!(
            eval(cumsum(col("i"))).unwrap(),
            Column::from(vec![Some(3i64), Some(4), None, None])
        );
        assert_eq!(
            eval(cumsum(col("i")).skip_missing()).unwrap(),
            Column::from(vec![Some(3i64), Some(4), None, Some(9)])
        );
        assert_eq!(
            eval(cummin(col("i")).skip_missing()).unwrap(),
            Column::from(vec![Some(3i64), Some(1), None, Some(1)])
        );
        assert_eq!(
            eval(cummax(col("i"))).unwrap(),
            Column::from(vec![Some(3i64), Some(3), None, None])
        );
    }

    #[test]
    fn real_folds() {
        assert_eq!(
            eval(cumprod(col("r"))).unwrap(),
            Column::from(vec![2.0, 1.0, 4.0, 4.0])
        );
        assert_eq!(
            eval(cummean(col("r"))).unwrap(),
            Column::from(vec![2.0, 1.25, 6.5 / 3.0, 7.5 / 4.0])
        );
        assert_eq!(
            eval(cummean(col("i")).skip_missing()).unwrap(),
            Column::from(vec![Some(3.0), Some(2.0), None, Some(3.0)])
        );
    }

    #[test]
    fn kleene_folds() {
        assert_eq!(
            eval(cumall(col("b"))).unwrap(),
            Column::from(vec![Some(true), None, Some(false), Some(false)])
        );
        assert_eq!(
            eval(cumany(col("b"))).unwrap(),
            Column::from(vec![Some(true), Some(true), Some(true), Some(true)])
        );
        assert_eq!(
            eval(cumall(col("b")).skip_missing()).unwrap(),
            Column::from(vec![Some(true), None, Some(false), Some(false)])
        );
    }

    #[test]
    fn overflow_is_missing_from_then_on() {
        let table = Table::try_from_columns([(
            "i",
            Column::from(vec![i64::MAX, 1, -5]),
        )])
        .unwrap();
        let result = ExprRef::from(cumsum(col("i")).skip_missing())
            .evaluate(&Scope::new(&table))
            .unwrap();
        assert_eq!(result, Column::from(vec![Some(i64::MAX), None, None]));
    }

    #[test]
    fn type_errors() {
        assert_eq!(eval(cumsum(col("s"))).unwrap_err().kind(), ErrorKind::Schema);
        assert_eq!(eval(cumall(col("i"))).unwrap_err().kind(), ErrorKind::Schema);
        assert_eq!(cumsum(col("i")).skip_missing().to_string(), "cumsum(i, skip_missing)");
    }
}
