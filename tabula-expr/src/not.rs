use std::any::Any;
use std::fmt::Display;
use std::sync::Arc;

use tabula_array::Column;
use tabula_array::compute::invert;
use tabula_error::TabulaResult;

use crate::{ExprRef, Scope, TabulaExpr};

#[derive(Debug, Eq)]
pub struct Not {
    child: ExprRef,
}

impl Not {
    pub fn new_expr(child: ExprRef) -> ExprRef {
        Arc::new(Self { child })
    }

    pub fn child(&self) -> &ExprRef {
        &self.child
    }
}

impl Display for Not {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "!")?;
        self.child.fmt(f)
    }
}

impl TabulaExpr for Not {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn evaluate(&self, scope: &Scope<'_>) -> TabulaResult<Column> {
        let child_result = self.child.evaluate(scope)?;
        invert(&child_result)
    }

    fn children(&self) -> Vec<&ExprRef> {
        vec![&self.child]
    }
}

impl PartialEq for Not {
    fn eq(&self, other: &Not) -> bool {
        other.child.eq(&self.child)
    }
}

/// Logical negation; missing stays missing.
pub fn not(operand: impl Into<ExprRef>) -> ExprRef {
    Not::new_expr(operand.into())
}
