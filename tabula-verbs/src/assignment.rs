use std::fmt::{Display, Formatter};

use tabula_array::Table;
use tabula_dtype::FieldName;
use tabula_error::{TabulaResult, tabula_bail};
use tabula_expr::{ExprRef, TabulaExprExt};

/// A named expression: the column `name` computed by `expr`.
#[derive(Debug, Clone)]
pub struct Assignment {
    name: FieldName,
    expr: ExprRef,
}

impl Assignment {
    pub fn new(name: impl Into<FieldName>, expr: impl Into<ExprRef>) -> Self {
        Self {
            name: name.into(),
            expr: expr.into(),
        }
    }

    pub fn name(&self) -> &FieldName {
        &self.name
    }

    pub fn expr(&self) -> &ExprRef {
        &self.expr
    }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.name, self.expr)
    }
}

/// Shorthand for [`Assignment::new`].
pub fn assign(name: impl Into<FieldName>, expr: impl Into<ExprRef>) -> Assignment {
    Assignment::new(name, expr)
}

/// Check the column references of sequentially scoped assignments before evaluating any.
///
/// Each expression may reference the table's columns and the names assigned before it. A
/// reference to a name only assigned later is a scope error; any other unknown name is a
/// schema error.
pub(crate) fn check_references(table: &Table, assignments: &[Assignment]) -> TabulaResult<()> {
    for (position, assignment) in assignments.iter().enumerate() {
        let earlier = &assignments[..position];
        for reference in assignment.expr.references() {
            if table.column_index(&reference).is_some()
                || earlier.iter().any(|a| a.name == reference)
            {
                continue;
            }
            if assignments[position..].iter().any(|a| a.name == reference) {
                tabula_bail!(
                    Scope: "{} references {}, which is only assigned later",
                    assignment,
                    reference
                );
            }
            // report the unknown column the way table lookups do
            table.require(&reference)?;
        }
    }
    Ok(())
}

/// Reject assignments to grouping columns.
pub(crate) fn check_not_grouping(table: &Table, assignments: &[Assignment]) -> TabulaResult<()> {
    if let Some(assignment) = assignments
        .iter()
        .find(|a| table.group_keys().contains(&a.name))
    {
        tabula_bail!(
            SemanticMisuse: "cannot assign to grouping column {}",
            assignment.name
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tabula_array::Column;
    use tabula_error::ErrorKind;
    use tabula_expr::{add, col, lit};

    use super::*;

    fn table() -> Table {
        Table::try_from_columns([("x", Column::from(vec![1i64]))]).unwrap()
    }

    #[test]
    fn sequential_scoping() {
        let ok = [
            assign("y", add(col("x"), lit(1i64))),
            assign("z", add(col("y"), col("x"))),
        ];
        check_references(&table(), &ok).unwrap();

        let later = [
            assign("y", add(col("z"), lit(1i64))),
            assign("z", col("x")),
        ];
        assert_eq!(
            check_references(&table(), &later).unwrap_err().kind(),
            ErrorKind::Scope
        );

        let unknown = [assign("y", col("w"))];
        assert_eq!(
            check_references(&table(), &unknown).unwrap_err().kind(),
            ErrorKind::Schema
        );
    }

    #[test]
    fn display() {
        assert_eq!(assign("y", add(col("x"), lit(1i64))).to_string(), "y = (x + 1)");
    }
}
