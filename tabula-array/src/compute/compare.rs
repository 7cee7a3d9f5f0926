use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use tabula_dtype::DType;
use tabula_error::{TabulaResult, tabula_bail};

use crate::Column;
use crate::compute::binary_map;

/// Comparison operators.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CompareOperator {
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOperator {
    /// The operator that holds when the operands are swapped.
    pub fn swap(self) -> Self {
        match self {
            Self::Eq => Self::Eq,
            Self::NotEq => Self::NotEq,
            Self::Gt => Self::Lt,
            Self::Gte => Self::Lte,
            Self::Lt => Self::Gt,
            Self::Lte => Self::Gte,
        }
    }

    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering.is_eq(),
            Self::NotEq => ordering.is_ne(),
            Self::Gt => ordering.is_gt(),
            Self::Gte => ordering.is_ge(),
            Self::Lt => ordering.is_lt(),
            Self::Lte => ordering.is_le(),
        }
    }
}

impl Display for CompareOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match &self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        };
        Display::fmt(display, f)
    }
}

/// Compare two columns element-wise.
///
/// Numeric columns compare numerically (Integer against Real included), Text compares
/// byte-wise and Bool orders `false < true`. A missing operand, or a `NaN` operand, yields a
/// missing result. Comparing any other pair of dtypes is a schema error.
pub fn compare(lhs: &Column, rhs: &Column, operator: CompareOperator) -> TabulaResult<Column> {
    let result: Vec<Option<bool>> = match (lhs.dtype(), rhs.dtype()) {
        (DType::Integer, DType::Integer) => {
            let l = lhs.i64_iter()?.collect::<Vec<_>>();
            let r = rhs.i64_iter()?.collect::<Vec<_>>();
            binary_map(&l, &r, |a, b| Some(operator.holds((*a)?.cmp(&(*b)?))))?
        }
        (l, r) if l.is_numeric() && r.is_numeric() => {
            let l = lhs.f64_iter()?.collect::<Vec<_>>();
            let r = rhs.f64_iter()?.collect::<Vec<_>>();
            binary_map(&l, &r, |a, b| {
                Some(operator.holds((*a)?.partial_cmp(&(*b)?)?))
            })?
        }
        (DType::Text, DType::Text) => {
            let l = lhs.str_iter()?.collect::<Vec<_>>();
            let r = rhs.str_iter()?.collect::<Vec<_>>();
            binary_map(&l, &r, |a, b| Some(operator.holds((*a)?.cmp((*b)?))))?
        }
        (DType::Bool, DType::Bool) => {
            let l = lhs.bool_iter()?.collect::<Vec<_>>();
            let r = rhs.bool_iter()?.collect::<Vec<_>>();
            binary_map(&l, &r, |a, b| Some(operator.holds((*a)?.cmp(&(*b)?))))?
        }
        (l, r) => tabula_bail!(Schema: "cannot compare {} with {} using {}", l, r, operator),
    };
    Ok(result.into_iter().collect())
}
