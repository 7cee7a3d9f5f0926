use itertools::Itertools;
use tabula_array::compute::{concat, take};
use tabula_array::{Column, Table};
use tabula_error::{TabulaResult, tabula_bail};
use tabula_expr::{ExprKind, Scope, TabulaExprExt};

use crate::assignment::check_references;
use crate::executor::map_groups;
use crate::mutate::place;
use crate::{Assignment, ExecutionOptions};

/// Reduce every group to one row. See [`summarise_with`].
pub fn summarise(table: &Table, summaries: &[Assignment]) -> TabulaResult<Table> {
    summarise_with(table, summaries, &ExecutionOptions::default())
}

/// Reduce every group to one row: the grouping keys followed by the summaries, in group order.
///
/// Each summary must yield exactly one value per group and may reference earlier summaries.
/// The result is grouped by all but the last key; an ungrouped table yields a single row.
pub fn summarise_with(
    table: &Table,
    summaries: &[Assignment],
    options: &ExecutionOptions,
) -> TabulaResult<Table> {
    log::debug!(
        "summarise: {} rows, {} groups, [{}]",
        table.nrows(),
        table.group_index().map_or(1, |index| index.len()),
        summaries.iter().format(", ")
    );
    for summary in summaries {
        if summary.expr().contains_kind(ExprKind::Window) {
            tabula_bail!(
                SemanticMisuse: "window functions cannot be used in summarise: {}",
                summary
            );
        }
        if table.group_keys().contains(summary.name()) {
            tabula_bail!(
                Schema: "summary {} has the name of a grouping column",
                summary.name()
            );
        }
    }
    check_references(table, summaries)?;

    let mut names = Vec::with_capacity(table.group_keys().len() + summaries.len());
    let mut columns = Vec::with_capacity(names.capacity());
    let nrows = match table.group_index() {
        Some(index) => {
            let first_rows = index.groups().iter().map(|g| g.rows()[0]).collect_vec();
            for key in index.keys().iter() {
                names.push(key.clone());
                columns.push(take(table.require(key)?, &first_rows));
            }
            index.len()
        }
        None => 1,
    };

    let per_group = if nrows == 0 {
        // no groups to reduce; evaluate over no rows only to learn each summary's dtype
        vec![summarise_scope(Scope::for_rows(table, &[]), summaries)?]
    } else {
        map_groups(table, options, |scope| summarise_scope(scope, summaries))?
    };
    for (position, summary) in summaries.iter().enumerate() {
        let values = per_group
            .iter()
            .map(|group| group[position].clone())
            .collect_vec();
        let column = concat(&values).map_err(|err| {
            err.with_context(format!("combining the groups of {summary}"))
        })?;
        let column = if nrows == 0 { take(&column, &[]) } else { column };
        place(&mut names, &mut columns, summary.name().clone(), column);
    }

    let result = Table::try_with_len(names.into(), columns, nrows)?;
    match table.group_index().and_then(|index| index.peeled_keys()) {
        Some(keys) => result.group_by_columns(keys),
        None => Ok(result),
    }
}

fn summarise_scope(mut scope: Scope<'_>, summaries: &[Assignment]) -> TabulaResult<Vec<Column>> {
    let mut values = Vec::with_capacity(summaries.len());
    for summary in summaries {
        let value = summary.expr().evaluate(&scope)?;
        if value.len() != 1 {
            tabula_bail!(
                Shape: "summary {} yields {} values for a group, expected 1",
                summary,
                value.len()
            );
        }
        scope.bind(summary.name().clone(), value.clone())?;
        values.push(value);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use tabula_dtype::{DType, FieldName, FieldNames};
    use tabula_error::ErrorKind;
    use tabula_expr::{col, cumsum, div, lag, max, mean, n, sum};

    use super::*;
    use crate::assign;

    fn names(table: &Table) -> Vec<&str> {
        table.names().iter().map(|n| n.as_ref()).collect()
    }

    fn sales() -> Table {
        Table::try_from_columns([
            ("region", Column::from(vec!["n", "s", "n", "s", "n"])),
            ("year", Column::from(vec![1i64, 1, 2, 1, 1])),
            ("amount", Column::from(vec![Some(10i64), Some(5), Some(7), None, Some(3)])),
        ])
        .unwrap()
    }

    fn grouped(keys: &[&str]) -> Table {
        sales()
            .group_by_columns(keys.iter().map(|&k| FieldName::from(k)).collect())
            .unwrap()
    }

    #[test]
    fn one_row_per_group() {
        let result = summarise(
            &grouped(&["region"]),
            &[
                assign("count", n()),
                assign("total", sum(col("amount")).skip_missing()),
                assign("strict", sum(col("amount"))),
            ],
        )
        .unwrap();
        assert_eq!(names(&result), vec!["region", "count", "total", "strict"]);
        assert_eq!(result.require("region").unwrap(), &Column::from(vec!["n", "s"]));
        assert_eq!(result.require("count").unwrap(), &Column::from(vec![3i64, 2]));
        assert_eq!(result.require("total").unwrap(), &Column::from(vec![20i64, 5]));
        assert_eq!(
            result.require("strict").unwrap(),
            &Column::from(vec![Some(20i64), None])
        );
        assert!(!result.is_grouped());
    }

    #[test]
    fn peels_last_key() {
        let result = summarise(&grouped(&["region", "year"]), &[assign("count", n())]).unwrap();
        assert_eq!(result.nrows(), 3);
        assert_eq!(result.group_keys(), &[FieldName::from("region")]);
        assert_eq!(result.require("year").unwrap(), &Column::from(vec![1i64, 1, 2]));
        assert_eq!(result.require("count").unwrap(), &Column::from(vec![2i64, 2, 1]));

        let again = summarise(&result, &[assign("count", sum(col("count")))]).unwrap();
        assert!(!again.is_grouped());
        assert_eq!(again.require("count").unwrap(), &Column::from(vec![3i64, 2]));
    }

    #[test]
    fn later_summaries_see_earlier_ones() {
        let result = summarise(
            &sales(),
            &[
                assign("count", n()),
                assign("biggest", max(col("amount")).skip_missing()),
                assign("share", div(col("biggest"), sum(col("amount")).skip_missing())),
            ],
        )
        .unwrap();
        assert_eq!(result.nrows(), 1);
        assert_eq!(result.require("count").unwrap(), &Column::from(vec![5i64]));
        assert_eq!(result.require("share").unwrap(), &Column::from(vec![0.4]));
    }

    #[test]
    fn empty_inputs() {
        let empty = sales().take_rows(&[]);
        let result = summarise(&empty, &[assign("count", n()), assign("avg", mean(col("amount")))])
            .unwrap();
        assert_eq!(result.nrows(), 1);
        assert_eq!(result.require("count").unwrap(), &Column::from(vec![0i64]));

        let grouped = empty
            .group_by_columns(FieldNames::from([FieldName::from("region")]))
            .unwrap();
        let result = summarise(&grouped, &[assign("count", n())]).unwrap();
        assert_eq!(result.nrows(), 0);
        assert_eq!(names(&result), vec!["region", "count"]);
        assert_eq!(result.require("count").unwrap().dtype(), DType::Integer);
    }

    #[test]
    fn errors() {
        let table = grouped(&["region"]);
        let kind = |summaries: Vec<Assignment>| summarise(&table, &summaries).unwrap_err().kind();
        assert_eq!(
            kind(vec![assign("c", sum(cumsum(col("amount"))))]),
            ErrorKind::SemanticMisuse
        );
        assert_eq!(
            kind(vec![assign("c", lag(col("amount")))]),
            ErrorKind::SemanticMisuse
        );
        assert_eq!(kind(vec![assign("c", col("amount"))]), ErrorKind::Shape);
        assert_eq!(kind(vec![assign("region", n())]), ErrorKind::Schema);
        assert_eq!(kind(vec![assign("c", sum(col("nope")))]), ErrorKind::Schema);
    }
}
