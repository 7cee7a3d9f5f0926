use std::any::Any;
use std::fmt::Display;
use std::sync::Arc;

use tabula_array::Column;
use tabula_array::compute::{CompareOperator, and_kleene, compare};
use tabula_error::TabulaResult;

use crate::{ExprRef, Scope, TabulaExpr};

/// `lower <= value & value <= upper`, evaluating each operand once.
#[derive(Debug, Eq)]
pub struct Between {
    value: ExprRef,
    lower: ExprRef,
    upper: ExprRef,
}

impl Between {
    pub fn new_expr(value: ExprRef, lower: ExprRef, upper: ExprRef) -> ExprRef {
        Arc::new(Self {
            value,
            lower,
            upper,
        })
    }
}

impl Display for Between {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} <= {} <= {})", self.lower, self.value, self.upper)
    }
}

impl PartialEq for Between {
    fn eq(&self, other: &Between) -> bool {
        self.value.eq(&other.value) && self.lower.eq(&other.lower) && self.upper.eq(&other.upper)
    }
}

impl TabulaExpr for Between {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn evaluate(&self, scope: &Scope<'_>) -> TabulaResult<Column> {
        let value = self.value.evaluate(scope)?;
        let lower = self.lower.evaluate(scope)?;
        let upper = self.upper.evaluate(scope)?;
        and_kleene(
            &compare(&lower, &value, CompareOperator::Lte)?,
            &compare(&value, &upper, CompareOperator::Lte)?,
        )
    }

    fn children(&self) -> Vec<&ExprRef> {
        vec![&self.value, &self.lower, &self.upper]
    }
}

/// Whether each value lies in the closed interval `[lower, upper]`.
pub fn between(
    value: impl Into<ExprRef>,
    lower: impl Into<ExprRef>,
    upper: impl Into<ExprRef>,
) -> ExprRef {
    Between::new_expr(value.into(), lower.into(), upper.into())
}

#[cfg(test)]
mod tests {
    use tabula_array::Table;

    use super::*;
    use crate::{col, lit};

    #[test]
    fn closed_interval() {
        let table = Table::try_from_columns([(
            "x",
            Column::from(vec![Some(1i64), Some(2), Some(5), None]),
        )])
        .unwrap();
        assert_eq!(
            between(col("x"), lit(2i64), lit(5.0))
                .evaluate(&Scope::new(&table))
                .unwrap(),
            Column::from(vec![Some(false), Some(true), Some(true), None])
        );
    }
}
