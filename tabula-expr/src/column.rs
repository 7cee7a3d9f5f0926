use std::any::Any;
use std::fmt::Display;
use std::sync::Arc;

use tabula_array::Column;
use tabula_dtype::FieldName;
use tabula_error::TabulaResult;

use crate::{ExprRef, Scope, TabulaExpr};

/// A reference to a column by name.
#[derive(Debug, PartialEq, Hash, Clone, Eq)]
pub struct ColumnRef {
    name: FieldName,
}

impl ColumnRef {
    pub fn new_expr(name: impl Into<FieldName>) -> ExprRef {
        Arc::new(Self { name: name.into() })
    }

    pub fn name(&self) -> &FieldName {
        &self.name
    }
}

impl Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl TabulaExpr for ColumnRef {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn evaluate(&self, scope: &Scope<'_>) -> TabulaResult<Column> {
        scope.column(&self.name)
    }

    fn children(&self) -> Vec<&ExprRef> {
        vec![]
    }
}

/// Create a reference to the column called `name`.
pub fn col(name: impl Into<FieldName>) -> ExprRef {
    ColumnRef::new_expr(name)
}
