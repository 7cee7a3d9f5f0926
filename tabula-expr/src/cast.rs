use std::any::Any;
use std::fmt::Display;
use std::sync::Arc;

use tabula_array::Column;
use tabula_array::compute::cast as cast_column;
use tabula_dtype::DType;
use tabula_error::TabulaResult;

use crate::{ExprRef, Scope, TabulaExpr};

#[derive(Debug, Eq)]
pub struct Cast {
    child: ExprRef,
    target: DType,
}

impl Cast {
    pub fn new_expr(child: ExprRef, target: DType) -> ExprRef {
        Arc::new(Self { child, target })
    }

    pub fn target(&self) -> DType {
        self.target
    }
}

impl PartialEq for Cast {
    fn eq(&self, other: &Cast) -> bool {
        self.target == other.target && self.child.eq(&other.child)
    }
}

impl Display for Cast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cast({}, {})", self.child, self.target)
    }
}

impl TabulaExpr for Cast {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn evaluate(&self, scope: &Scope<'_>) -> TabulaResult<Column> {
        cast_column(&self.child.evaluate(scope)?, self.target)
    }

    fn children(&self) -> Vec<&ExprRef> {
        vec![&self.child]
    }
}

/// Convert each value to `target`; values with no conversion become missing.
pub fn cast(child: impl Into<ExprRef>, target: DType) -> ExprRef {
    Cast::new_expr(child.into(), target)
}
