use std::cmp::Ordering;

use tabula_error::{TabulaResult, tabula_bail};

use crate::{Column, ColumnValues};

/// One key of a multi-column sort.
#[derive(Debug, Clone, Copy)]
pub struct SortColumn<'a> {
    pub column: &'a Column,
    pub descending: bool,
}

impl<'a> SortColumn<'a> {
    pub fn ascending(column: &'a Column) -> Self {
        Self {
            column,
            descending: false,
        }
    }

    pub fn descending(column: &'a Column) -> Self {
        Self {
            column,
            descending: true,
        }
    }
}

/// The row order that sorts the given keys lexicographically.
///
/// The sort is stable. Missing values sort after every present value and `NaN` sorts after
/// every number but before missing, in both directions.
pub fn sort_indices(keys: &[SortColumn<'_>]) -> TabulaResult<Vec<usize>> {
    let nrows = keys.first().map_or(0, |k| k.column.len());
    if let Some(key) = keys.iter().find(|k| k.column.len() != nrows) {
        tabula_bail!(
            Shape: "sort key of length {} does not match {} rows",
            key.column.len(),
            nrows
        );
    }
    let mut indices = (0..nrows).collect::<Vec<_>>();
    indices.sort_by(|&a, &b| {
        keys.iter()
            .map(|key| compare_rows(key.column, a, b, key.descending))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    Ok(indices)
}

/// Compare two rows of a column in sort order.
pub fn compare_rows(column: &Column, a: usize, b: usize, descending: bool) -> Ordering {
    match (sort_class(column, a), sort_class(column, b)) {
        (SortClass::Value, SortClass::Value) => {
            let ordering = match column.values() {
                ColumnValues::Bool(v) => v.value(a).cmp(&v.value(b)),
                ColumnValues::Integer(v) => v[a].cmp(&v[b]),
                ColumnValues::Real(v) => v[a].partial_cmp(&v[b]).unwrap_or(Ordering::Equal),
                ColumnValues::Text(v) => v[a].as_bytes().cmp(v[b].as_bytes()),
            };
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        }
        (lhs, rhs) => lhs.cmp(&rhs),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum SortClass {
    Value,
    NaN,
    Missing,
}

fn sort_class(column: &Column, idx: usize) -> SortClass {
    if !column.is_valid(idx) {
        return SortClass::Missing;
    }
    match column.values() {
        ColumnValues::Real(v) if v[idx].is_nan() => SortClass::NaN,
        _ => SortClass::Value,
    }
}
