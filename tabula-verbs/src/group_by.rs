use std::fmt::{Display, Formatter};

use itertools::Itertools;
use tabula_array::Table;
use tabula_dtype::{FieldName, FieldNames};
use tabula_error::{TabulaResult, tabula_bail};
use tabula_expr::{ExprRef, Scope};

use crate::mutate::place;

/// A grouping key: an existing column, or an expression materialised as a new column first.
#[derive(Debug, Clone)]
pub enum GroupKey {
    Column(FieldName),
    Expr(FieldName, ExprRef),
}

impl GroupKey {
    pub fn column(name: impl Into<FieldName>) -> Self {
        Self::Column(name.into())
    }

    pub fn expr(name: impl Into<FieldName>, expr: impl Into<ExprRef>) -> Self {
        Self::Expr(name.into(), expr.into())
    }

    pub fn name(&self) -> &FieldName {
        match self {
            Self::Column(name) | Self::Expr(name, _) => name,
        }
    }
}

impl From<&str> for GroupKey {
    fn from(value: &str) -> Self {
        Self::column(value)
    }
}

impl Display for GroupKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Column(name) => write!(f, "{name}"),
            Self::Expr(name, expr) => write!(f, "{name} = {expr}"),
        }
    }
}

/// Group the rows of `table` by the given keys, replacing any existing grouping.
///
/// Rows are neither reordered nor filtered; groups are ordered by the first appearance of their
/// key tuple. Grouping by no keys removes the grouping.
pub fn group_by(table: &Table, keys: &[GroupKey]) -> TabulaResult<Table> {
    log::debug!(
        "group_by: {} rows by [{}]",
        table.nrows(),
        keys.iter().format(", ")
    );
    if keys.is_empty() {
        return Ok(ungroup(table));
    }

    let mut names = table.names().to_vec();
    let mut columns = table.columns().to_vec();
    let mut scope = Scope::new(table);
    for key in keys {
        match key {
            GroupKey::Column(name) => {
                table.require(name)?;
            }
            GroupKey::Expr(name, expr) => {
                let column = expr.evaluate(&scope)?;
                if column.len() != table.nrows() {
                    tabula_bail!(
                        SemanticMisuse: "grouping key {} must give one value per row, \
                        got {} values for {} rows",
                        key,
                        column.len(),
                        table.nrows()
                    );
                }
                scope.bind(name.clone(), column.clone())?;
                place(&mut names, &mut columns, name.clone(), column);
            }
        }
    }

    let keys: FieldNames = keys.iter().map(|key| key.name().clone()).collect();
    Table::try_with_len(names.into(), columns, table.nrows())?.group_by_columns(keys)
}

/// Drop the grouping of `table`.
pub fn ungroup(table: &Table) -> Table {
    table.clone().ungrouped()
}
