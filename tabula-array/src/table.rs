use std::sync::Arc;

use tabula_dtype::{DisplayFieldNames, FieldName, FieldNames, first_duplicate};
use tabula_error::{TabulaResult, tabula_bail, tabula_err};
use tabula_mask::Mask;
use tabula_scalar::Scalar;

use crate::compute::{filter, take};
use crate::{Column, GroupIndex};

/// An ordered mapping from column name to [`Column`], all of the same length, with an optional
/// [`GroupIndex`] attached.
///
/// Tables are immutable. Cloning a table, or deriving a table that keeps some of its columns,
/// shares those columns' buffers.
#[derive(Clone, Debug)]
pub struct Table {
    names: FieldNames,
    columns: Arc<[Column]>,
    nrows: usize,
    groups: Option<Arc<GroupIndex>>,
}

impl Table {
    /// Create an ungrouped table. The row count is taken from the first column (zero when there
    /// are no columns).
    pub fn try_new<N, I>(names: I, columns: Vec<Column>) -> TabulaResult<Self>
    where
        N: Into<FieldName>,
        I: IntoIterator<Item = N>,
    {
        let nrows = columns.first().map_or(0, Column::len);
        Self::try_with_len(names.into_iter().map(Into::into).collect(), columns, nrows)
    }

    /// Create an ungrouped table from `(name, column)` pairs.
    pub fn try_from_columns<N, I>(columns: I) -> TabulaResult<Self>
    where
        N: Into<FieldName>,
        I: IntoIterator<Item = (N, Column)>,
    {
        let (names, columns): (Vec<FieldName>, Vec<Column>) = columns
            .into_iter()
            .map(|(name, column)| (name.into(), column))
            .unzip();
        Self::try_new(names, columns)
    }

    /// Create an ungrouped table with an explicit row count, which is kept even when there are
    /// no columns.
    pub fn try_with_len(
        names: FieldNames,
        columns: Vec<Column>,
        nrows: usize,
    ) -> TabulaResult<Self> {
        if names.len() != columns.len() {
            tabula_bail!("{} names given for {} columns", names.len(), columns.len());
        }
        if let Some(dup) = first_duplicate(names.iter()) {
            tabula_bail!(Schema: "duplicate column name {}", dup);
        }
        if let Some((name, column)) = names
            .iter()
            .zip(columns.iter())
            .find(|(_, column)| column.len() != nrows)
        {
            tabula_bail!(
                Shape: "column {} has length {}, expected {}",
                name,
                column.len(),
                nrows
            );
        }
        Ok(Self {
            names,
            columns: columns.into(),
            nrows,
            groups: None,
        })
    }

    /// A table with no columns and no rows.
    pub fn empty() -> Self {
        Self {
            names: Arc::new([]),
            columns: Arc::new([]),
            nrows: 0,
            groups: None,
        }
    }

    pub fn names(&self) -> &FieldNames {
        &self.names
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.names.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &Column)> {
        self.names.iter().zip(self.columns.iter())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n.as_ref() == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|idx| &self.columns[idx])
    }

    /// Look up a column by name, failing with a schema error when it does not exist.
    pub fn require(&self, name: &str) -> TabulaResult<&Column> {
        self.column(name).ok_or_else(|| {
            tabula_err!(
                Schema: "unknown column {}, available columns are [{}]",
                name,
                DisplayFieldNames(&self.names)
            )
        })
    }

    /// The values of row `index`, in column order.
    ///
    /// ## Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn row(&self, index: usize) -> Vec<Scalar> {
        self.columns.iter().map(|c| c.scalar_at(index)).collect()
    }

    pub fn group_index(&self) -> Option<&GroupIndex> {
        self.groups.as_deref()
    }

    pub fn is_grouped(&self) -> bool {
        self.groups.is_some()
    }

    /// The grouping key names, empty when ungrouped.
    pub fn group_keys(&self) -> &[FieldName] {
        match self.groups.as_deref() {
            Some(index) => index.keys(),
            None => &[],
        }
    }

    /// Attach a group index, checking that its keys are columns of this table and that it
    /// partitions every row.
    pub fn with_group_index(mut self, index: GroupIndex) -> TabulaResult<Self> {
        for key in index.keys().iter() {
            self.require(key)?;
        }
        if index.row_count() != self.nrows {
            tabula_bail!(
                Shape: "group index covers {} rows, table has {}",
                index.row_count(),
                self.nrows
            );
        }
        self.groups = Some(Arc::new(index));
        Ok(self)
    }

    /// Group by the named columns, replacing any existing group index.
    pub fn group_by_columns(self, keys: FieldNames) -> TabulaResult<Self> {
        let key_columns = keys
            .iter()
            .map(|k| self.require(k))
            .collect::<TabulaResult<Vec<_>>>()?;
        let index = GroupIndex::try_new(keys.clone(), &key_columns)?;
        self.ungrouped().with_group_index(index)
    }

    pub fn ungrouped(mut self) -> Self {
        self.groups = None;
        self
    }

    /// The rows at the given positions, in order. The group index is dropped.
    pub fn take_rows(&self, indices: &[usize]) -> Self {
        Self {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| take(c, indices)).collect(),
            nrows: indices.len(),
            groups: None,
        }
    }

    /// The rows selected by the mask. The group index is dropped.
    pub fn filter_rows(&self, mask: &Mask) -> TabulaResult<Self> {
        if mask.len() != self.nrows {
            tabula_bail!(
                Shape: "mask of length {} applied to {} rows",
                mask.len(),
                self.nrows
            );
        }
        Ok(Self {
            names: self.names.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| filter(c, mask))
                .collect::<TabulaResult<Vec<_>>>()?
                .into(),
            nrows: mask.true_count(),
            groups: None,
        })
    }
}

/// Tables are equal when they have the same names, columns and grouping.
impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
            && self.nrows == other.nrows
            && self.columns == other.columns
            && self.groups == other.groups
    }
}

#[cfg(test)]
mod tests {
    use tabula_error::ErrorKind;

    use super::*;

    fn table() -> Table {
        Table::try_from_columns([
            ("g", Column::from(vec!["a", "b", "a"])),
            ("x", Column::from(vec![1i64, 2, 3])),
        ])
        .unwrap()
    }

    #[test]
    fn construction() {
        let table = table();
        assert_eq!(table.nrows(), 3);
        assert_eq!(table.ncols(), 2);
        assert_eq!(table.column_index("x"), Some(1));
        assert_eq!(table.row(1), vec![Scalar::text("b"), Scalar::integer(2)]);
        assert!(!table.is_grouped());
    }

    #[test]
    fn duplicate_names_are_schema_errors() {
        let err = Table::try_new(
            ["x", "x"],
            vec![Column::from(vec![1i64]), Column::from(vec![2i64])],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn unequal_lengths_are_shape_errors() {
        let err = Table::try_new(
            ["x", "y"],
            vec![Column::from(vec![1i64]), Column::from(vec![2i64, 3])],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
    }

    #[test]
    fn unknown_column() {
        assert_eq!(table().require("nope").unwrap_err().kind(), ErrorKind::Schema);
    }

    #[test]
    fn empty_table() {
        let table = Table::try_new(Vec::<&str>::new(), vec![]).unwrap();
        assert_eq!(table.nrows(), 0);
        assert_eq!(table, Table::empty());
    }

    #[test]
    fn grouping_and_rows() {
        let grouped = table()
            .group_by_columns(FieldNames::from([FieldName::from("g")]))
            .unwrap();
        assert_eq!(grouped.group_keys(), &[FieldName::from("g")]);
        assert_eq!(grouped.group_index().unwrap().len(), 2);

        let taken = grouped.take_rows(&[2, 0]);
        assert!(!taken.is_grouped());
        assert_eq!(taken.require("x").unwrap(), &Column::from(vec![3i64, 1]));

        let filtered = table()
            .filter_rows(&Mask::from_iter([false, true, true]))
            .unwrap();
        assert_eq!(filtered.nrows(), 2);
        assert_eq!(filtered.require("g").unwrap(), &Column::from(vec!["b", "a"]));
    }
}
