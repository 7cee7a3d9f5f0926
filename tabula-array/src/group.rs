//! The group index: an ordered partition of a table's rows by key tuple.

use std::sync::Arc;

use itertools::Itertools;
use tabula_dtype::{DisplayFieldNames, FieldName, FieldNames, first_duplicate};
use tabula_error::{TabulaResult, tabula_bail};
use tabula_scalar::Scalar;

use crate::Column;
use crate::aliases::hash_map::HashMap;

/// One group: its key tuple and its rows, in current row order.
#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    key: Arc<[Scalar]>,
    rows: Vec<usize>,
}

impl Group {
    pub fn key(&self) -> &[Scalar] {
        &self.key
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// A partition of row indices into groups, listed in order of first appearance of their key
/// tuple. Missing key values compare equal to each other, so they form their own group.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupIndex {
    keys: FieldNames,
    groups: Arc<[Group]>,
}

impl GroupIndex {
    /// Partition the rows of the key columns by key tuple.
    pub fn try_new(keys: FieldNames, key_columns: &[&Column]) -> TabulaResult<Self> {
        if keys.is_empty() {
            tabula_bail!("a group index needs at least one key");
        }
        if keys.len() != key_columns.len() {
            tabula_bail!(
                "{} key names given for {} key columns",
                keys.len(),
                key_columns.len()
            );
        }
        if let Some(dup) = first_duplicate(keys.iter()) {
            tabula_bail!(Schema: "grouping key {} given more than once", dup);
        }
        let nrows = key_columns[0].len();
        if let Some((name, column)) = keys
            .iter()
            .zip(key_columns)
            .find(|(_, column)| column.len() != nrows)
        {
            tabula_bail!(
                Shape: "key column {} has length {}, expected {}",
                name,
                column.len(),
                nrows
            );
        }

        let mut lookup: HashMap<Arc<[Scalar]>, usize> = HashMap::new();
        let mut groups: Vec<Group> = Vec::new();
        for row in 0..nrows {
            let key: Arc<[Scalar]> = key_columns.iter().map(|c| c.scalar_at(row)).collect();
            match lookup.get(&key) {
                Some(&group) => groups[group].rows.push(row),
                None => {
                    lookup.insert(key.clone(), groups.len());
                    groups.push(Group {
                        key,
                        rows: vec![row],
                    });
                }
            }
        }
        log::trace!(
            "grouped {} rows by [{}] into {} groups",
            nrows,
            DisplayFieldNames(&keys),
            groups.len()
        );

        Ok(Self {
            keys,
            groups: groups.into(),
        })
    }

    pub fn keys(&self) -> &FieldNames {
        &self.keys
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of rows across all groups.
    pub fn row_count(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }

    /// The keys that remain after one summarise, or `None` when no keys remain.
    pub fn peeled_keys(&self) -> Option<FieldNames> {
        (self.keys.len() > 1).then(|| self.keys[..self.keys.len() - 1].iter().cloned().collect())
    }

    /// Re-key the index to the surviving rows of a filter.
    ///
    /// `kept` holds the old positions of the surviving rows in their new order. Groups keep
    /// their order; groups with no surviving rows are dropped.
    pub fn filter_rows(&self, kept: &[usize], nrows: usize) -> Self {
        let positions = new_positions(kept, nrows);
        let groups = self
            .groups
            .iter()
            .filter_map(|group| {
                let rows = group
                    .rows
                    .iter()
                    .filter_map(|&row| positions[row])
                    .collect_vec();
                (!rows.is_empty()).then(|| Group {
                    key: group.key.clone(),
                    rows,
                })
            })
            .collect();
        Self {
            keys: self.keys.clone(),
            groups,
        }
    }

    /// Re-list each group's rows after the table rows were reordered.
    ///
    /// `order[new]` is the old position of the row now at `new`.
    pub fn reorder_rows(&self, order: &[usize]) -> Self {
        let positions = new_positions(order, order.len());
        let groups = self
            .groups
            .iter()
            .map(|group| {
                let rows = group
                    .rows
                    .iter()
                    .filter_map(|&row| positions[row])
                    .sorted_unstable()
                    .collect_vec();
                Group {
                    key: group.key.clone(),
                    rows,
                }
            })
            .collect();
        Self {
            keys: self.keys.clone(),
            groups,
        }
    }

    /// Replace the name of a grouping key.
    pub fn rename_key(&self, old: &str, new: FieldName) -> Self {
        let keys = self
            .keys
            .iter()
            .map(|k| if k.as_ref() == old { new.clone() } else { k.clone() })
            .collect();
        Self {
            keys,
            groups: self.groups.clone(),
        }
    }
}

fn new_positions(old_positions: &[usize], nrows: usize) -> Vec<Option<usize>> {
    let mut positions = vec![None; nrows];
    for (new, &old) in old_positions.iter().enumerate() {
        positions[old] = Some(new);
    }
    positions
}

#[cfg(test)]
mod tests {
    use tabula_dtype::DType;

    use super::*;

    fn names(names: &[&str]) -> FieldNames {
        names.iter().map(|&n| FieldName::from(n)).collect()
    }

    fn index() -> GroupIndex {
        let g = Column::from(vec![Some("b"), Some("a"), None, Some("b"), None]);
        GroupIndex::try_new(names(&["g"]), &[&g]).unwrap()
    }

    #[test]
    fn first_appearance_order() {
        let index = index();
        assert_eq!(index.len(), 3);
        assert_eq!(index.groups()[0].key(), &[Scalar::text("b")]);
        assert_eq!(index.groups()[0].rows(), &[0, 3]);
        assert_eq!(index.groups()[1].rows(), &[1]);
        assert_eq!(index.groups()[2].key(), &[Scalar::null(DType::Text)]);
        assert_eq!(index.groups()[2].rows(), &[2, 4]);
        assert_eq!(index.row_count(), 5);
    }

    #[test]
    fn multiple_keys() {
        let a = Column::from(vec![1i64, 1, 2, 1]);
        let b = Column::from(vec![true, false, true, true]);
        let index = GroupIndex::try_new(names(&["a", "b"]), &[&a, &b]).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.groups()[0].rows(), &[0, 3]);
        assert_eq!(index.peeled_keys(), Some(names(&["a"])));
    }

    #[test]
    fn filter_drops_empty_groups() {
        let filtered = index().filter_rows(&[0, 2, 3], 5);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.groups()[0].rows(), &[0, 2]);
        assert_eq!(filtered.groups()[1].rows(), &[1]);
        assert_eq!(filtered.groups()[1].key(), &[Scalar::null(DType::Text)]);
    }

    #[test]
    fn reorder_keeps_group_order() {
        // rows reversed
        let reordered = index().reorder_rows(&[4, 3, 2, 1, 0]);
        assert_eq!(reordered.groups()[0].key(), &[Scalar::text("b")]);
        assert_eq!(reordered.groups()[0].rows(), &[1, 4]);
        assert_eq!(reordered.groups()[2].rows(), &[0, 2]);
    }

    #[test]
    fn rejects_duplicate_keys() {
        let a = Column::from(vec![1i64]);
        assert!(GroupIndex::try_new(names(&["a", "a"]), &[&a, &a]).is_err());
        assert!(GroupIndex::try_new(names(&[]), &[]).is_err());
    }
}
