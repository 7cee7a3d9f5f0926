use std::any::Any;
use std::fmt::Display;
use std::sync::Arc;

use tabula_array::Column;
use tabula_array::compute::{MathFunction, negate, unary_math};
use tabula_error::TabulaResult;

use crate::{ExprRef, Scope, TabulaExpr};

/// Unary minus.
#[derive(Debug, Eq)]
pub struct Negate {
    child: ExprRef,
}

impl Negate {
    pub fn new_expr(child: ExprRef) -> ExprRef {
        Arc::new(Self { child })
    }

    pub fn child(&self) -> &ExprRef {
        &self.child
    }
}

impl Display for Negate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "-{}", self.child)
    }
}

impl TabulaExpr for Negate {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn evaluate(&self, scope: &Scope<'_>) -> TabulaResult<Column> {
        negate(&self.child.evaluate(scope)?)
    }

    fn children(&self) -> Vec<&ExprRef> {
        vec![&self.child]
    }
}

impl PartialEq for Negate {
    fn eq(&self, other: &Negate) -> bool {
        other.child.eq(&self.child)
    }
}

/// An element-wise mathematical function applied to a numeric operand.
#[derive(Debug, Eq)]
pub struct MathExpr {
    function: MathFunction,
    child: ExprRef,
}

impl MathExpr {
    pub fn new_expr(function: MathFunction, child: ExprRef) -> ExprRef {
        Arc::new(Self { function, child })
    }

    pub fn function(&self) -> MathFunction {
        self.function
    }
}

impl Display for MathExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.function, self.child)
    }
}

impl TabulaExpr for MathExpr {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn evaluate(&self, scope: &Scope<'_>) -> TabulaResult<Column> {
        unary_math(&self.child.evaluate(scope)?, self.function)
    }

    fn children(&self) -> Vec<&ExprRef> {
        vec![&self.child]
    }
}

impl PartialEq for MathExpr {
    fn eq(&self, other: &MathExpr) -> bool {
        self.function == other.function && other.child.eq(&self.child)
    }
}

pub fn neg(operand: impl Into<ExprRef>) -> ExprRef {
    Negate::new_expr(operand.into())
}

pub fn abs(operand: impl Into<ExprRef>) -> ExprRef {
    MathExpr::new_expr(MathFunction::Abs, operand.into())
}

pub fn sqrt(operand: impl Into<ExprRef>) -> ExprRef {
    MathExpr::new_expr(MathFunction::Sqrt, operand.into())
}

/// Natural logarithm.
pub fn ln(operand: impl Into<ExprRef>) -> ExprRef {
    MathExpr::new_expr(MathFunction::Ln, operand.into())
}

pub fn exp(operand: impl Into<ExprRef>) -> ExprRef {
    MathExpr::new_expr(MathFunction::Exp, operand.into())
}

/// Round half to even.
pub fn round(operand: impl Into<ExprRef>) -> ExprRef {
    MathExpr::new_expr(MathFunction::Round, operand.into())
}
