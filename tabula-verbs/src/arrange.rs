use std::fmt::{Display, Formatter};

use itertools::Itertools;
use tabula_array::compute::{SortColumn, sort_indices};
use tabula_array::{Column, Table};
use tabula_error::{TabulaResult, tabula_bail};
use tabula_expr::{ExprRef, Scope};

use crate::ArrangeOptions;

/// An expression to sort by, and its direction.
#[derive(Debug, Clone)]
pub struct SortKey {
    expr: ExprRef,
    descending: bool,
}

impl SortKey {
    pub fn asc(expr: impl Into<ExprRef>) -> Self {
        Self {
            expr: expr.into(),
            descending: false,
        }
    }

    pub fn desc(expr: impl Into<ExprRef>) -> Self {
        Self {
            expr: expr.into(),
            descending: true,
        }
    }

    pub fn expr(&self) -> &ExprRef {
        &self.expr
    }

    pub fn is_descending(&self) -> bool {
        self.descending
    }
}

impl From<ExprRef> for SortKey {
    fn from(expr: ExprRef) -> Self {
        Self::asc(expr)
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.descending {
            write!(f, "desc({})", self.expr)
        } else {
            write!(f, "{}", self.expr)
        }
    }
}

/// Sort the rows by the given keys. See [`arrange_with`].
pub fn arrange(table: &Table, keys: &[SortKey]) -> TabulaResult<Table> {
    arrange_with(table, keys, &ArrangeOptions::default())
}

/// Sort the rows lexicographically by the given keys.
///
/// The sort is stable. Missing values sort last and `NaN` just before them, in both directions.
/// Keys are evaluated over the whole table. Grouping only affects the order when
/// [`ArrangeOptions::by_group`] is set; the group index keeps its groups in their order either
/// way.
pub fn arrange_with(
    table: &Table,
    keys: &[SortKey],
    options: &ArrangeOptions,
) -> TabulaResult<Table> {
    log::debug!(
        "arrange: {} rows by [{}]",
        table.nrows(),
        keys.iter().format(", ")
    );
    let mut columns: Vec<(Column, bool)> = Vec::with_capacity(keys.len());
    if options.by_group {
        for key in table.group_keys() {
            columns.push((table.require(key)?.clone(), false));
        }
    }
    let scope = Scope::new(table);
    for key in keys {
        let column = key.expr.evaluate(&scope)?;
        let column = match column.len() {
            len if len == table.nrows() => column,
            1 => Column::constant(&column.scalar_at(0), table.nrows()),
            len => tabula_bail!(
                Shape: "sort key {} has length {}, expected {}",
                key,
                len,
                table.nrows()
            ),
        };
        columns.push((column, key.descending));
    }
    if columns.is_empty() {
        return Ok(table.clone());
    }

    let sort_columns = columns
        .iter()
        .map(|(column, descending)| SortColumn {
            column,
            descending: *descending,
        })
        .collect_vec();
    let order = sort_indices(&sort_columns)?;
    let sorted = table.take_rows(&order);
    match table.group_index() {
        None => Ok(sorted),
        Some(index) => sorted.with_group_index(index.reorder_rows(&order)),
    }
}

#[cfg(test)]
mod tests {
    use tabula_dtype::{FieldName, FieldNames};
    use tabula_error::ErrorKind;
    use tabula_expr::{col, lit, neg};

    use super::*;

    fn table() -> Table {
        Table::try_from_columns([
            ("g", Column::from(vec!["b", "a", "b", "a"])),
            ("x", Column::from(vec![Some(2i64), None, Some(1), Some(2)])),
            ("id", Column::from(vec![0i64, 1, 2, 3])),
        ])
        .unwrap()
    }

    fn ids(table: &Table) -> Column {
        table.require("id").unwrap().clone()
    }

    #[test]
    fn stable_with_missing_last() {
        let asc = arrange(&table(), &[SortKey::asc(col("x"))]).unwrap();
        assert_eq!(ids(&asc), Column::from(vec![2i64, 0, 3, 1]));
        let desc = arrange(&table(), &[SortKey::desc(col("x"))]).unwrap();
        assert_eq!(ids(&desc), Column::from(vec![0i64, 3, 2, 1]));
    }

    #[test]
    fn multiple_keys_and_expressions() {
        let sorted = arrange(
            &table(),
            &[SortKey::asc(col("g")), SortKey::asc(neg(col("id")))],
        )
        .unwrap();
        assert_eq!(ids(&sorted), Column::from(vec![3i64, 1, 2, 0]));
        // a constant key leaves the order unchanged
        let same = arrange(&table(), &[lit(1i64).into()]).unwrap();
        assert_eq!(same, table());
    }

    #[test]
    fn groups_keep_their_order() {
        let grouped = table()
            .group_by_columns(FieldNames::from([FieldName::from("g")]))
            .unwrap();
        let sorted = arrange(&grouped, &[SortKey::asc(col("x"))]).unwrap();
        assert_eq!(ids(&sorted), Column::from(vec![2i64, 0, 3, 1]));
        let index = sorted.group_index().unwrap();
        assert_eq!(index.groups()[0].key()[0].as_str(), Some("b"));
        assert_eq!(index.groups()[0].rows(), &[0, 1]);
        assert_eq!(index.groups()[1].rows(), &[2, 3]);

        let by_group =
            arrange_with(&grouped, &[SortKey::desc(col("id"))], &ArrangeOptions::by_group())
                .unwrap();
        assert_eq!(ids(&by_group), Column::from(vec![3i64, 1, 2, 0]));
    }

    #[test]
    fn unknown_key() {
        assert_eq!(
            arrange(&table(), &[SortKey::asc(col("nope"))]).unwrap_err().kind(),
            ErrorKind::Schema
        );
    }
}
