//! Runs a computation once per group, serially or on the rayon pool.

use rayon::prelude::*;
use tabula_array::Table;
use tabula_error::TabulaResult;
use tabula_expr::Scope;

use crate::ExecutionOptions;

/// Evaluate `f` over the scope of every group, or over the whole table when it is ungrouped.
///
/// Results are returned in group order whichever way the groups were executed. A grouped table
/// with no groups yields no results.
pub(crate) fn map_groups<T, F>(
    table: &Table,
    options: &ExecutionOptions,
    f: F,
) -> TabulaResult<Vec<T>>
where
    T: Send,
    F: Fn(Scope<'_>) -> TabulaResult<T> + Sync,
{
    let Some(index) = table.group_index() else {
        return Ok(vec![f(Scope::new(table))?]);
    };
    let groups = index.groups();
    if options.is_parallel(groups.len()) {
        log::debug!("evaluating {} groups on the rayon pool", groups.len());
        groups
            .par_iter()
            .map(|group| f(Scope::for_rows(table, group.rows())))
            .collect()
    } else {
        groups
            .iter()
            .map(|group| f(Scope::for_rows(table, group.rows())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tabula_array::Column;
    use tabula_dtype::{FieldName, FieldNames};

    use super::*;

    #[rstest]
    #[case(ExecutionOptions::serial())]
    #[case(ExecutionOptions::serial().with_min_parallel_groups(2))]
    fn results_in_group_order(#[case] options: ExecutionOptions) {
        let table = Table::try_from_columns([(
            "g",
            Column::from(vec![3i64, 1, 3, 2, 1, 4]),
        )])
        .unwrap()
        .group_by_columns(FieldNames::from([FieldName::from("g")]))
        .unwrap();
        let firsts = map_groups(&table, &options, |scope| {
            Ok(scope.column("g")?.scalar_at(0).as_i64())
        })
        .unwrap();
        assert_eq!(firsts, vec![Some(3), Some(1), Some(2), Some(4)]);
    }

    #[test]
    fn ungrouped_is_one_scope() {
        let table = Table::try_from_columns([("x", Column::from(vec![1i64, 2]))]).unwrap();
        let lens = map_groups(&table, &ExecutionOptions::default(), |scope| Ok(scope.len())).unwrap();
        assert_eq!(lens, vec![2]);
    }
}
