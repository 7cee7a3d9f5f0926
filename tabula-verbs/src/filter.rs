use itertools::Itertools;
use tabula_array::Table;
use tabula_array::compute::{and_kleene, true_positions};
use tabula_dtype::DType;
use tabula_error::{TabulaResult, tabula_bail};
use tabula_expr::ExprRef;
use tabula_mask::Mask;

use crate::ExecutionOptions;
use crate::executor::map_groups;

/// Keep the rows for which every predicate is `true`.
///
/// See [`filter_with`].
pub fn filter(table: &Table, predicates: &[ExprRef]) -> TabulaResult<Table> {
    filter_with(table, predicates, &ExecutionOptions::default())
}

/// Keep the rows for which every predicate is `true`; `false` and missing both drop the row.
///
/// Predicates are evaluated per group on grouped tables. Kept rows keep their order, and the
/// group index drops groups left without rows.
pub fn filter_with(
    table: &Table,
    predicates: &[ExprRef],
    options: &ExecutionOptions,
) -> TabulaResult<Table> {
    log::debug!(
        "filter: {} rows, {} groups, {} predicates",
        table.nrows(),
        table.group_index().map_or(1, |index| index.len()),
        predicates.len()
    );
    if predicates.is_empty() {
        return Ok(table.clone());
    }

    let kept = map_groups(table, options, |scope| {
        let mut combined = None;
        for predicate in predicates {
            let result = predicate.evaluate(&scope)?;
            if result.dtype() != DType::Bool {
                tabula_bail!(
                    Schema: "filter predicate {} must be bool, found {}",
                    predicate,
                    result.dtype()
                );
            }
            if result.len() != scope.len() && result.len() != 1 {
                tabula_bail!(
                    Shape: "filter predicate {} has length {}, expected {} or 1",
                    predicate,
                    result.len(),
                    scope.len()
                );
            }
            combined = Some(match combined {
                None => result,
                Some(previous) => and_kleene(&previous, &result)?,
            });
        }
        let Some(combined) = combined else {
            return Ok(Vec::new());
        };
        let mut keep = true_positions(&combined)?;
        if keep.len() != scope.len() {
            // a length-1 predicate decides for the whole scope
            keep = if keep.all_false() {
                Mask::new_false(scope.len())
            } else {
                Mask::new_true(scope.len())
            };
        }
        Ok(keep
            .to_indices()
            .into_iter()
            .map(|idx| scope.table_row(idx))
            .collect_vec())
    })?;

    let kept = kept.into_iter().flatten().sorted_unstable().collect_vec();
    let filtered = table.take_rows(&kept);
    match table.group_index() {
        None => Ok(filtered),
        Some(index) => filtered.with_group_index(index.filter_rows(&kept, table.nrows())),
    }
}

#[cfg(test)]
mod tests {
    use tabula_array::Column;
    use tabula_dtype::{FieldName, FieldNames};
    use tabula_error::ErrorKind;
    use tabula_expr::{col, gt, is_missing, lit, mean, or};

    use super::*;

    fn table() -> Table {
        Table::try_from_columns([("x", Column::from(vec![Some(1i64), None, Some(3)]))]).unwrap()
    }

    #[test]
    fn missing_drops_the_row() {
        let result = filter(&table(), &[gt(col("x"), lit(1i64))]).unwrap();
        assert_eq!(result.require("x").unwrap(), &Column::from(vec![3i64]));

        let result = filter(
            &table(),
            &[or(is_missing(col("x")), gt(col("x"), lit(1i64)))],
        )
        .unwrap();
        assert_eq!(
            result.require("x").unwrap(),
            &Column::from(vec![None, Some(3i64)])
        );
    }

    #[test]
    fn scalar_predicates_broadcast() {
        assert_eq!(filter(&table(), &[lit(true)]).unwrap(), table());
        assert_eq!(filter(&table(), &[lit(false)]).unwrap().nrows(), 0);
        assert_eq!(filter(&table(), &[]).unwrap(), table());
    }

    #[test]
    fn grouped_predicates_see_their_group() {
        let table = Table::try_from_columns([
            ("g", Column::from(vec!["a", "b", "a", "b", "c"])),
            ("x", Column::from(vec![1i64, 10, 3, 20, 5])),
        ])
        .unwrap()
        .group_by_columns(FieldNames::from([FieldName::from("g")]))
        .unwrap();
        let result = filter(&table, &[gt(col("x"), mean(col("x")))]).unwrap();
        assert_eq!(result.require("x").unwrap(), &Column::from(vec![3i64, 20]));
        let index = result.group_index().unwrap();
        // group "c" has no rows left
        assert_eq!(index.len(), 2);
        assert_eq!(index.groups()[0].rows(), &[0]);
        assert_eq!(index.groups()[1].rows(), &[1]);
    }

    #[test]
    fn errors() {
        assert_eq!(
            filter(&table(), &[col("x")]).unwrap_err().kind(),
            ErrorKind::Schema
        );
        assert_eq!(
            filter(&table(), &[gt(col("y"), lit(1i64))]).unwrap_err().kind(),
            ErrorKind::Schema
        );
    }
}
