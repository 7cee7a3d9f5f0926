use std::any::Any;
use std::fmt::Display;
use std::sync::Arc;

use itertools::Itertools;
use tabula_array::Column;
use tabula_array::compute::is_in as is_in_set;
use tabula_error::TabulaResult;
use tabula_scalar::Scalar;

use crate::{ExprRef, Scope, TabulaExpr};

/// Membership of each value in a fixed set of scalars.
#[derive(Debug, Eq)]
pub struct IsIn {
    child: ExprRef,
    set: Arc<[Scalar]>,
}

impl IsIn {
    pub fn new_expr(child: ExprRef, set: Arc<[Scalar]>) -> ExprRef {
        Arc::new(Self { child, set })
    }

    pub fn set(&self) -> &[Scalar] {
        &self.set
    }
}

impl PartialEq for IsIn {
    fn eq(&self, other: &IsIn) -> bool {
        self.child.eq(&other.child) && self.set == other.set
    }
}

impl Display for IsIn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} in [{}])", self.child, self.set.iter().format(", "))
    }
}

impl TabulaExpr for IsIn {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn evaluate(&self, scope: &Scope<'_>) -> TabulaResult<Column> {
        Ok(is_in_set(&self.child.evaluate(scope)?, &self.set))
    }

    fn children(&self) -> Vec<&ExprRef> {
        vec![&self.child]
    }
}

/// Whether each value occurs in `set`. Missing values match a missing member of the set.
pub fn is_in<S, I>(child: impl Into<ExprRef>, set: I) -> ExprRef
where
    S: Into<Scalar>,
    I: IntoIterator<Item = S>,
{
    IsIn::new_expr(child.into(), set.into_iter().map(Into::into).collect())
}

#[cfg(test)]
mod tests {
    use tabula_array::Table;

    use super::*;
    use crate::col;

    #[test]
    fn text_membership() {
        let table =
            Table::try_from_columns([("s", Column::from(vec![Some("a"), Some("c"), None]))])
                .unwrap();
        let expr = is_in(col("s"), ["a", "b"]);
        assert_eq!(expr.to_string(), "(s in [\"a\", \"b\"])");
        assert_eq!(
            expr.evaluate(&Scope::new(&table)).unwrap(),
            Column::from(vec![true, false, false])
        );
    }
}
