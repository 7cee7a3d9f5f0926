use std::fmt::{Display, Formatter};

use tabula_dtype::DType;
use tabula_error::{TabulaResult, tabula_bail};

use crate::Column;
use crate::compute::binary_map;

/// Binary arithmetic operators.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum NumericOperator {
    Add,
    Sub,
    Mul,
    /// True division, always Real.
    Div,
    /// Exponentiation, always Real.
    Pow,
    /// Floor division.
    IntDiv,
    /// Remainder of floor division, taking the sign of the divisor.
    Mod,
}

impl NumericOperator {
    /// The checked Integer kernel, for operators whose Integer result stays Integer.
    fn integer_kernel(self) -> Option<fn(i64, i64) -> Option<i64>> {
        match self {
            Self::Add => Some(i64::checked_add),
            Self::Sub => Some(i64::checked_sub),
            Self::Mul => Some(i64::checked_mul),
            Self::IntDiv => Some(floor_div),
            Self::Mod => Some(floor_mod),
            Self::Div | Self::Pow => None,
        }
    }

    fn real(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div => a / b,
            Self::Pow => a.powf(b),
            Self::IntDiv => (a / b).floor(),
            Self::Mod => a - b * (a / b).floor(),
        }
    }
}

impl Display for NumericOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match &self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "^",
            Self::IntDiv => "%/%",
            Self::Mod => "%%",
        };
        Display::fmt(display, f)
    }
}

/// Apply an arithmetic operator element-wise.
///
/// Integer operands stay Integer for `+ - * %/% %%`; overflow and division by zero yield a
/// missing value. Any Real operand, or the `/` and `^` operators, produce Real.
pub fn binary_numeric(lhs: &Column, rhs: &Column, op: NumericOperator) -> TabulaResult<Column> {
    if !lhs.dtype().is_numeric() || !rhs.dtype().is_numeric() {
        tabula_bail!(
            Schema: "cannot apply {} to {} and {}",
            op,
            lhs.dtype(),
            rhs.dtype()
        );
    }
    if let (DType::Integer, DType::Integer, Some(kernel)) =
        (lhs.dtype(), rhs.dtype(), op.integer_kernel())
    {
        let l = lhs.i64_iter()?.collect::<Vec<_>>();
        let r = rhs.i64_iter()?.collect::<Vec<_>>();
        let result = binary_map(&l, &r, |a, b| kernel((*a)?, (*b)?))?;
        return Ok(result.into_iter().collect());
    }
    let l = lhs.f64_iter()?.collect::<Vec<_>>();
    let r = rhs.f64_iter()?.collect::<Vec<_>>();
    let result = binary_map(&l, &r, |a, b| Some(op.real((*a)?, (*b)?)))?;
    Ok(result.into_iter().collect())
}

/// Unary minus. Negating `i64::MIN` yields a missing value.
pub fn negate(column: &Column) -> TabulaResult<Column> {
    match column.dtype() {
        DType::Integer => Ok(column.i64_iter()?.map(|v| v?.checked_neg()).collect()),
        DType::Real => Ok(column.f64_iter()?.map(|v| v.map(|f| -f)).collect()),
        other => tabula_bail!(Schema: "cannot negate a {} column", other),
    }
}

/// Element-wise mathematical functions.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MathFunction {
    /// Absolute value; keeps the input dtype.
    Abs,
    Sqrt,
    /// Natural logarithm.
    Ln,
    Exp,
    /// Round half to even; keeps the input dtype.
    Round,
}

impl Display for MathFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match &self {
            Self::Abs => "abs",
            Self::Sqrt => "sqrt",
            Self::Ln => "ln",
            Self::Exp => "exp",
            Self::Round => "round",
        };
        Display::fmt(display, f)
    }
}

pub fn unary_math(column: &Column, function: MathFunction) -> TabulaResult<Column> {
    match (column.dtype(), function) {
        (DType::Integer, MathFunction::Abs) => {
            Ok(column.i64_iter()?.map(|v| v?.checked_abs()).collect())
        }
        (DType::Integer, MathFunction::Round) => Ok(column.clone()),
        (dtype, _) if dtype.is_numeric() => Ok(column
            .f64_iter()?
            .map(|v| {
                v.map(|f| match function {
                    MathFunction::Abs => f.abs(),
                    MathFunction::Sqrt => f.sqrt(),
                    MathFunction::Ln => f.ln(),
                    MathFunction::Exp => f.exp(),
                    MathFunction::Round => f.round_ties_even(),
                })
            })
            .collect()),
        (dtype, _) => tabula_bail!(Schema: "cannot apply {} to a {} column", function, dtype),
    }
}

fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    Some(if a % b != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    })
}

fn floor_mod(a: i64, b: i64) -> Option<i64> {
    let r = a.checked_rem(b)?;
    Some(if r != 0 && ((r < 0) != (b < 0)) { r + b } else { r })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(NumericOperator::Add, Column::from(vec![Some(4i64), None, Some(6)]))]
    #[case(NumericOperator::Sub, Column::from(vec![Some(-2i64), None, Some(0)]))]
    #[case(NumericOperator::Mul, Column::from(vec![Some(3i64), None, Some(9)]))]
    #[case(NumericOperator::Div, Column::from(vec![Some(1.0 / 3.0), None, Some(1.0)]))]
    #[case(NumericOperator::Pow, Column::from(vec![Some(1f64.powf(3.0)), None, Some(3f64.powf(3.0))]))]
    #[case(NumericOperator::IntDiv, Column::from(vec![Some(0i64), None, Some(1)]))]
    #[case(NumericOperator::Mod, Column::from(vec![Some(1i64), None, Some(0)]))]
    fn integer_operators(#[case] op: NumericOperator, #[case] expected: Column) {
        let lhs = Column::from(vec![Some(1i64), None, Some(3)]);
        let rhs = Column::from(vec![3i64]);
        assert_eq!(binary_numeric(&lhs, &rhs, op).unwrap(), expected);
    }

    #[rstest]
    #[case(7, 3)]
    #[case(-7, 3)]
    #[case(7, -3)]
    #[case(-7, -3)]
    #[case(6, 3)]
    #[case(0, -5)]
    fn floor_division_identity(#[case] x: i64, #[case] y: i64) {
        let q = floor_div(x, y).unwrap();
        let r = floor_mod(x, y).unwrap();
        assert_eq!(y * q + r, x);
        assert!(r == 0 || (r < 0) == (y < 0));
    }

    #[test]
    fn real_floor_division_identity() {
        let x = Column::from(vec![5.5, -5.5]);
        let y = Column::from(vec![2.0]);
        let q = binary_numeric(&x, &y, NumericOperator::IntDiv).unwrap();
        let r = binary_numeric(&x, &y, NumericOperator::Mod).unwrap();
        assert_eq!(q, Column::from(vec![2.0, -3.0]));
        assert_eq!(r, Column::from(vec![1.5, 0.5]));
    }

    #[test]
    fn overflow_and_zero_division_are_missing() {
        let lhs = Column::from(vec![i64::MAX, 1]);
        let rhs = Column::from(vec![1i64, 0]);
        assert_eq!(
            binary_numeric(&lhs, &rhs, NumericOperator::Add).unwrap(),
            Column::from(vec![None, Some(1i64)])
        );
        assert_eq!(
            binary_numeric(&lhs, &rhs, NumericOperator::IntDiv).unwrap(),
            Column::from(vec![Some(i64::MAX), None])
        );
    }

    #[test]
    fn mixed_operands_promote() {
        let lhs = Column::from(vec![1i64, 2]);
        let rhs = Column::from(vec![0.5]);
        let result = binary_numeric(&lhs, &rhs, NumericOperator::Mul).unwrap();
        assert_eq!(result, Column::from(vec![0.5, 1.0]));
    }

    #[test]
    fn non_numeric() {
        let lhs = Column::from(vec!["a"]);
        assert!(binary_numeric(&lhs, &lhs, NumericOperator::Add).is_err());
        assert!(negate(&lhs).is_err());
    }

    #[rstest]
    #[case(MathFunction::Abs, Column::from(vec![Some(2.5), None, Some(4.0)]))]
    #[case(MathFunction::Round, Column::from(vec![Some(-2.0), None, Some(4.0)]))]
    #[case(MathFunction::Sqrt, Column::from(vec![Some(f64::NAN), None, Some(2.0)]))]
    fn math(#[case] function: MathFunction, #[case] expected: Column) {
        let column = Column::from(vec![Some(-2.5), None, Some(4.0)]);
        assert_eq!(unary_math(&column, function).unwrap(), expected);
    }

    #[test]
    fn integer_abs_stays_integer() {
        let column = Column::from(vec![-3i64, i64::MIN]);
        assert_eq!(
            unary_math(&column, MathFunction::Abs).unwrap(),
            Column::from(vec![Some(3i64), None])
        );
    }
}
