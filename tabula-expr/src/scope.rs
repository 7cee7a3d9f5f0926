use tabula_array::compute::take;
use tabula_array::{Column, Table};
use tabula_dtype::FieldName;
use tabula_error::{TabulaResult, tabula_bail};

/// The rows and columns an expression is evaluated against.
///
/// A scope covers either every row of a table or the rows of one group. Columns bound with
/// [`Scope::bind`] shadow table columns of the same name; a bound column is either of the scope
/// length or of length 1.
#[derive(Debug, Clone)]
pub struct Scope<'a> {
    table: &'a Table,
    rows: Option<&'a [usize]>,
    bindings: Vec<(FieldName, Column)>,
}

impl<'a> Scope<'a> {
    /// A scope over every row of the table.
    pub fn new(table: &'a Table) -> Self {
        Self {
            table,
            rows: None,
            bindings: Vec::new(),
        }
    }

    /// A scope over the given rows of the table, in the given order.
    pub fn for_rows(table: &'a Table, rows: &'a [usize]) -> Self {
        Self {
            table,
            rows: Some(rows),
            bindings: Vec::new(),
        }
    }

    /// The number of rows in scope.
    pub fn len(&self) -> usize {
        self.rows.map_or(self.table.nrows(), <[usize]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn table(&self) -> &'a Table {
        self.table
    }

    /// The table rows in scope, or `None` when the scope covers every row.
    pub fn rows(&self) -> Option<&'a [usize]> {
        self.rows
    }

    /// The table row of the scope row at `idx`.
    pub fn table_row(&self, idx: usize) -> usize {
        self.rows.map_or(idx, |rows| rows[idx])
    }

    /// Whether `name` resolves to a bound or table column.
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.iter().any(|(n, _)| n.as_ref() == name)
            || self.table.column_index(name).is_some()
    }

    /// Bind a column under `name`, shadowing any earlier binding or table column.
    pub fn bind(&mut self, name: FieldName, column: Column) -> TabulaResult<()> {
        if column.len() != self.len() && column.len() != 1 {
            tabula_bail!(
                Shape: "cannot bind {} of length {} in a scope of {} rows",
                name,
                column.len(),
                self.len()
            );
        }
        self.bindings.retain(|(n, _)| n != &name);
        self.bindings.push((name, column));
        Ok(())
    }

    /// Resolve a column by name, restricted to the rows in scope.
    pub fn column(&self, name: &str) -> TabulaResult<Column> {
        if let Some((_, column)) = self.bindings.iter().find(|(n, _)| n.as_ref() == name) {
            return Ok(column.clone());
        }
        let column = self.table.require(name)?;
        Ok(match self.rows {
            None => column.clone(),
            Some(rows) => take(column, rows),
        })
    }
}

#[cfg(test)]
mod tests {
    use tabula_error::ErrorKind;

    use super::*;

    fn table() -> Table {
        Table::try_from_columns([("x", Column::from(vec![1i64, 2, 3, 4]))]).unwrap()
    }

    #[test]
    fn rows_restrict_columns() {
        let table = table();
        let rows = [3, 1];
        let scope = Scope::for_rows(&table, &rows);
        assert_eq!(scope.len(), 2);
        assert_eq!(scope.table_row(0), 3);
        assert_eq!(scope.column("x").unwrap(), Column::from(vec![4i64, 2]));
    }

    #[test]
    fn bindings_shadow_table_columns() {
        let table = table();
        let mut scope = Scope::new(&table);
        scope.bind("x".into(), Column::from(vec![0i64])).unwrap();
        scope.bind("y".into(), Column::from(vec![1.0, 2.0, 3.0, 4.0])).unwrap();
        assert_eq!(scope.column("x").unwrap(), Column::from(vec![0i64]));
        assert!(scope.contains("y"));
        assert_eq!(
            scope.column("z").unwrap_err().kind(),
            ErrorKind::Schema
        );
    }

    #[test]
    fn bind_checks_length() {
        let table = table();
        let mut scope = Scope::new(&table);
        let err = scope.bind("y".into(), Column::from(vec![1i64, 2])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
    }
}
