use std::any::Any;
use std::fmt::Display;
use std::sync::Arc;

use itertools::Itertools;
use tabula_array::Column;
use tabula_array::compute;
use tabula_error::{TabulaResult, tabula_bail};

use crate::{ExprRef, Scope, TabulaExpr};

/// Element-wise choice between two expressions.
#[derive(Debug, Eq)]
pub struct IfElse {
    condition: ExprRef,
    if_true: ExprRef,
    if_false: ExprRef,
}

impl IfElse {
    pub fn new_expr(condition: ExprRef, if_true: ExprRef, if_false: ExprRef) -> ExprRef {
        Arc::new(Self {
            condition,
            if_true,
            if_false,
        })
    }
}

impl PartialEq for IfElse {
    fn eq(&self, other: &IfElse) -> bool {
        self.condition.eq(&other.condition)
            && self.if_true.eq(&other.if_true)
            && self.if_false.eq(&other.if_false)
    }
}

impl Display for IfElse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "if_else({}, {}, {})",
            self.condition, self.if_true, self.if_false
        )
    }
}

impl TabulaExpr for IfElse {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn evaluate(&self, scope: &Scope<'_>) -> TabulaResult<Column> {
        compute::if_else(
            &self.condition.evaluate(scope)?,
            &self.if_true.evaluate(scope)?,
            &self.if_false.evaluate(scope)?,
        )
    }

    fn children(&self) -> Vec<&ExprRef> {
        vec![&self.condition, &self.if_true, &self.if_false]
    }
}

/// The first present value among the arguments, row by row.
#[derive(Debug, Eq)]
pub struct Coalesce {
    children: Vec<ExprRef>,
}

impl Coalesce {
    pub fn try_new_expr(children: Vec<ExprRef>) -> TabulaResult<ExprRef> {
        if children.is_empty() {
            tabula_bail!("coalesce needs at least one argument");
        }
        Ok(Arc::new(Self { children }))
    }
}

impl PartialEq for Coalesce {
    fn eq(&self, other: &Coalesce) -> bool {
        self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(other.children.iter())
                .all(|(a, b)| a.eq(b))
    }
}

impl Display for Coalesce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "coalesce({})", self.children.iter().format(", "))
    }
}

impl TabulaExpr for Coalesce {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn evaluate(&self, scope: &Scope<'_>) -> TabulaResult<Column> {
        let columns = self
            .children
            .iter()
            .map(|child| child.evaluate(scope))
            .collect::<TabulaResult<Vec<_>>>()?;
        compute::coalesce(&columns)
    }

    fn children(&self) -> Vec<&ExprRef> {
        self.children.iter().collect()
    }
}

/// `if_true` where `condition` holds, `if_false` where it does not, missing where it is missing.
pub fn if_else(
    condition: impl Into<ExprRef>,
    if_true: impl Into<ExprRef>,
    if_false: impl Into<ExprRef>,
) -> ExprRef {
    IfElse::new_expr(condition.into(), if_true.into(), if_false.into())
}

/// The first present value among `children`, row by row.
///
/// ## Errors
///
/// Fails when `children` is empty.
pub fn coalesce<I>(children: I) -> TabulaResult<ExprRef>
where
    I: IntoIterator,
    I::Item: Into<ExprRef>,
{
    Coalesce::try_new_expr(children.into_iter().map(Into::into).collect())
}
