use std::any::Any;
use std::fmt::Display;
use std::sync::Arc;

use tabula_array::Column;
use tabula_array::compute::is_null;
use tabula_error::TabulaResult;

use crate::{ExprRef, Scope, TabulaExpr};

#[derive(Debug, Eq)]
pub struct IsMissing {
    child: ExprRef,
}

impl IsMissing {
    pub fn new_expr(child: ExprRef) -> ExprRef {
        Arc::new(Self { child })
    }
}

impl PartialEq for IsMissing {
    fn eq(&self, other: &IsMissing) -> bool {
        self.child.eq(&other.child)
    }
}

impl Display for IsMissing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "is_missing({})", self.child)
    }
}

impl TabulaExpr for IsMissing {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn evaluate(&self, scope: &Scope<'_>) -> TabulaResult<Column> {
        let column = self.child.evaluate(scope)?;
        Ok(is_null(&column))
    }

    fn children(&self) -> Vec<&ExprRef> {
        vec![&self.child]
    }
}

/// Whether each value is missing. The result is never missing itself.
pub fn is_missing(child: impl Into<ExprRef>) -> ExprRef {
    IsMissing::new_expr(child.into())
}

#[cfg(test)]
mod tests {
    use tabula_array::Table;

    use super::*;
    use crate::{col, lit};

    #[test]
    fn dtype_and_values() {
        let table =
            Table::try_from_columns([("x", Column::from(vec![Some(1.0), None, Some(f64::NAN)]))])
                .unwrap();
        let scope = Scope::new(&table);
        assert_eq!(
            is_missing(col("x")).evaluate(&scope).unwrap(),
            Column::from(vec![false, true, false])
        );
        assert_eq!(
            is_missing(lit(Option::<i64>::None)).evaluate(&scope).unwrap(),
            Column::from(vec![true])
        );
    }
}
