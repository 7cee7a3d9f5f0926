use std::any::Any;
use std::fmt::Display;
use std::sync::Arc;

use tabula_array::Column;
use tabula_error::TabulaResult;
use tabula_scalar::Scalar;

use crate::{ExprRef, Scope, TabulaExpr};

/// A single value, evaluated to a length-1 column that broadcasts against its scope.
#[derive(Debug, PartialEq, Eq)]
pub struct Literal {
    value: Scalar,
}

impl Literal {
    pub fn new_expr(value: Scalar) -> ExprRef {
        Arc::new(Self { value })
    }

    pub fn value(&self) -> &Scalar {
        &self.value
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl TabulaExpr for Literal {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn evaluate(&self, _scope: &Scope<'_>) -> TabulaResult<Column> {
        Ok(Column::constant(&self.value, 1))
    }

    fn children(&self) -> Vec<&ExprRef> {
        vec![]
    }
}

/// Create a new `Literal` expression from a type that coerces to `Scalar`.
///
/// ## Example usage
///
/// ```
/// use tabula_expr::{Literal, lit};
/// use tabula_scalar::Scalar;
///
/// let number = lit(34i64);
///
/// let literal = number.as_any()
///     .downcast_ref::<Literal>()
///     .unwrap();
/// assert_eq!(literal.value(), &Scalar::integer(34));
/// ```
pub fn lit(value: impl Into<Scalar>) -> ExprRef {
    Literal::new_expr(value.into())
}
