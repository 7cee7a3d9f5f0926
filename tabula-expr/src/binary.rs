use std::any::Any;
use std::fmt::Display;
use std::sync::Arc;

use tabula_array::Column;
use tabula_array::compute::{
    BooleanOperator, binary_boolean, binary_numeric, compare, kleene_and, kleene_or,
};
use tabula_dtype::DType;
use tabula_error::{TabulaResult, tabula_bail};

use crate::operators::OperatorKind;
use crate::{ExprRef, Operator, Scope, TabulaExpr};

#[derive(Debug, Clone, Eq)]
pub struct BinaryExpr {
    lhs: ExprRef,
    operator: Operator,
    rhs: ExprRef,
}

impl BinaryExpr {
    pub fn new_expr(lhs: ExprRef, operator: Operator, rhs: ExprRef) -> ExprRef {
        Arc::new(Self { lhs, operator, rhs })
    }

    pub fn lhs(&self) -> &ExprRef {
        &self.lhs
    }

    pub fn rhs(&self) -> &ExprRef {
        &self.rhs
    }

    pub fn op(&self) -> Operator {
        self.operator
    }

    fn short_circuit(&self, op: BooleanOperator, scope: &Scope<'_>) -> TabulaResult<Column> {
        let lhs = scalar_bool(self.operator, self.lhs.evaluate(scope)?)?;
        match (op, lhs) {
            (BooleanOperator::And, Some(false)) | (BooleanOperator::Or, Some(true)) => {
                return Ok(Column::from(vec![lhs]));
            }
            _ => {}
        }
        let rhs = scalar_bool(self.operator, self.rhs.evaluate(scope)?)?;
        let result = match op {
            BooleanOperator::And => kleene_and(lhs, rhs),
            BooleanOperator::Or => kleene_or(lhs, rhs),
        };
        Ok(Column::from(vec![result]))
    }
}

fn scalar_bool(operator: Operator, column: Column) -> TabulaResult<Option<bool>> {
    if column.dtype() != DType::Bool {
        tabula_bail!(Schema: "{} needs bool operands, found {}", operator, column.dtype());
    }
    if column.len() != 1 {
        tabula_bail!(
            Shape: "{} needs operands of length 1, found length {}",
            operator,
            column.len()
        );
    }
    Ok(column.scalar_at(0).as_bool())
}

impl Display for BinaryExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.lhs, self.operator, self.rhs)
    }
}

impl TabulaExpr for BinaryExpr {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn evaluate(&self, scope: &Scope<'_>) -> TabulaResult<Column> {
        if let OperatorKind::ShortCircuit(op) = self.operator.kind() {
            return self.short_circuit(op, scope);
        }
        let lhs = self.lhs.evaluate(scope)?;
        let rhs = self.rhs.evaluate(scope)?;
        match self.operator.kind() {
            OperatorKind::Numeric(op) => binary_numeric(&lhs, &rhs, op),
            OperatorKind::Compare(op) => compare(&lhs, &rhs, op),
            OperatorKind::Boolean(op) => binary_boolean(&lhs, &rhs, op),
            OperatorKind::ShortCircuit(op) => self.short_circuit(op, scope),
        }
    }

    fn children(&self) -> Vec<&ExprRef> {
        vec![&self.lhs, &self.rhs]
    }
}

impl PartialEq for BinaryExpr {
    fn eq(&self, other: &BinaryExpr) -> bool {
        other.operator == self.operator && other.lhs.eq(&self.lhs) && other.rhs.eq(&self.rhs)
    }
}

macro_rules! binary_builder {
    ($(#[$meta:meta])* $name:ident, $op:ident) => {
        $(#[$meta])*
        pub fn $name(lhs: impl Into<ExprRef>, rhs: impl Into<ExprRef>) -> ExprRef {
            BinaryExpr::new_expr(lhs.into(), Operator::$op, rhs.into())
        }
    };
}

binary_builder!(
    /// Create a new `BinaryExpr` using the `Add` operator.
    ///
    /// ## Example usage
    ///
    /// ```
    /// use tabula_array::{Column, Table};
    /// use tabula_expr::{Scope, add, col, lit};
    ///
    /// let table = Table::try_from_columns([("x", Column::from(vec![1i64, 2, 3]))]).unwrap();
    /// let result = add(col("x"), lit(10i64)).evaluate(&Scope::new(&table)).unwrap();
    ///
    /// assert_eq!(result, Column::from(vec![11i64, 12, 13]));
    /// ```
    add,
    Add
);
binary_builder!(sub, Sub);
binary_builder!(mul, Mul);
binary_builder!(
    /// True division; the result is always real.
    div,
    Div
);
binary_builder!(pow, Pow);
binary_builder!(
    /// Floor division, `%/%`.
    int_div,
    IntDiv
);
binary_builder!(
    /// Remainder of floor division, `%%`.
    modulo,
    Mod
);
binary_builder!(
    /// Create a new `BinaryExpr` using the `Eq` operator.
    ///
    /// ## Example usage
    ///
    /// ```
    /// use tabula_array::{Column, Table};
    /// use tabula_expr::{Scope, col, eq, lit};
    ///
    /// let table = Table::try_from_columns([("x", Column::from(vec![Some(1i64), Some(3), None]))])
    ///     .unwrap();
    /// let result = eq(col("x"), lit(3i64)).evaluate(&Scope::new(&table)).unwrap();
    ///
    /// assert_eq!(result, Column::from(vec![Some(false), Some(true), None]));
    /// ```
    eq,
    Eq
);
binary_builder!(not_eq, NotEq);
binary_builder!(gt, Gt);
binary_builder!(gt_eq, Gte);
binary_builder!(lt, Lt);
binary_builder!(lt_eq, Lte);
binary_builder!(
    /// Element-wise Kleene conjunction.
    and,
    And
);
binary_builder!(
    /// Element-wise Kleene disjunction.
    or,
    Or
);
binary_builder!(
    /// Scalar conjunction of two length-1 operands; `rhs` is not evaluated when `lhs` is
    /// `false`.
    and_then,
    AndThen
);
binary_builder!(
    /// Scalar disjunction of two length-1 operands; `rhs` is not evaluated when `lhs` is
    /// `true`.
    or_else,
    OrElse
);

#[cfg(test)]
mod tests {
    use tabula_array::Table;
    use tabula_error::ErrorKind;

    use super::*;
    use crate::{col, lit};

    fn table() -> Table {
        Table::try_from_columns([
            ("x", Column::from(vec![Some(5i64), Some(-7), None])),
            ("y", Column::from(vec![2i64, 2, 2])),
            ("flag", Column::from(vec![Some(true), Some(false), None])),
        ])
        .unwrap()
    }

    fn eval(expr: ExprRef) -> TabulaResult<Column> {
        let table = table();
        expr.evaluate(&Scope::new(&table))
    }

    #[test]
    fn arithmetic() {
        assert_eq!(
            eval(int_div(col("x"), col("y"))).unwrap(),
            Column::from(vec![Some(2i64), Some(-4), None])
        );
        assert_eq!(
            eval(modulo(col("x"), col("y"))).unwrap(),
            Column::from(vec![Some(1i64), Some(1), None])
        );
        assert_eq!(
            eval(div(col("x"), lit(0i64))).unwrap(),
            Column::from(vec![Some(f64::INFINITY), Some(f64::NEG_INFINITY), None])
        );
        assert_eq!(
            eval(add(col("x"), lit("a"))).unwrap_err().kind(),
            ErrorKind::Schema
        );
    }

    #[test]
    fn comparisons_and_logic() {
        assert_eq!(
            eval(and(gt(col("x"), lit(0i64)), col("flag"))).unwrap(),
            Column::from(vec![Some(true), Some(false), None])
        );
        assert_eq!(
            eval(or(lt_eq(col("x"), lit(-7i64)), col("flag"))).unwrap(),
            Column::from(vec![Some(true), Some(true), None])
        );
    }

    #[test]
    fn literals_broadcast() {
        assert_eq!(
            eval(mul(lit(2i64), lit(3i64))).unwrap(),
            Column::from(vec![6i64])
        );
    }

    #[test]
    fn short_circuit_skips_rhs() {
        // the right side would be a schema error if it were evaluated
        assert_eq!(
            eval(and_then(lit(false), col("missing"))).unwrap(),
            Column::from(vec![false])
        );
        assert_eq!(
            eval(or_else(lit(true), col("missing"))).unwrap(),
            Column::from(vec![true])
        );
        assert_eq!(
            eval(and_then(lit(true), lit(Option::<bool>::None))).unwrap(),
            Column::from(vec![Option::<bool>::None])
        );
    }

    #[test]
    fn short_circuit_needs_scalars() {
        assert_eq!(
            eval(and_then(col("flag"), lit(true))).unwrap_err().kind(),
            ErrorKind::Shape
        );
        assert_eq!(
            eval(or_else(lit(1i64), lit(true))).unwrap_err().kind(),
            ErrorKind::Schema
        );
    }
}
