use itertools::Itertools;
use tabula_array::compute::scatter;
use tabula_array::{Column, Table};
use tabula_dtype::{DisplayFieldNames, FieldName};
use tabula_error::{TabulaResult, tabula_bail};
use tabula_expr::Scope;

use crate::assignment::{check_not_grouping, check_references};
use crate::executor::map_groups;
use crate::{Assignment, ExecutionOptions};

/// Add or replace columns. See [`mutate_with`].
pub fn mutate(table: &Table, assignments: &[Assignment]) -> TabulaResult<Table> {
    mutate_with(table, assignments, &ExecutionOptions::default())
}

/// Add or replace columns, evaluating each assignment per group.
///
/// Assignments are scoped sequentially: each sees the table's columns and every earlier
/// assignment. New names are appended, existing names are replaced in place. Length-1 results
/// are broadcast to their group.
pub fn mutate_with(
    table: &Table,
    assignments: &[Assignment],
    options: &ExecutionOptions,
) -> TabulaResult<Table> {
    log::debug!(
        "mutate: {} rows, {} groups, [{}]",
        table.nrows(),
        table.group_index().map_or(1, |index| index.len()),
        assignments.iter().format(", ")
    );
    let computed = evaluate_assignments(table, assignments, options)?;
    let mut names = table.names().to_vec();
    let mut columns = table.columns().to_vec();
    for (assignment, column) in assignments.iter().zip(computed) {
        place(&mut names, &mut columns, assignment.name().clone(), column);
    }
    with_groups_of(table, Table::try_with_len(names.into(), columns, table.nrows())?)
}

/// Compute new columns, keeping only the grouping columns and the computed ones.
pub fn transmute(table: &Table, assignments: &[Assignment]) -> TabulaResult<Table> {
    transmute_with(table, assignments, &ExecutionOptions::default())
}

pub fn transmute_with(
    table: &Table,
    assignments: &[Assignment],
    options: &ExecutionOptions,
) -> TabulaResult<Table> {
    log::debug!(
        "transmute: {} rows, [{}]",
        table.nrows(),
        assignments.iter().format(", ")
    );
    let computed = evaluate_assignments(table, assignments, options)?;
    let mut names = Vec::with_capacity(table.group_keys().len() + assignments.len());
    let mut columns = Vec::with_capacity(names.capacity());
    for key in table.group_keys() {
        names.push(key.clone());
        columns.push(table.require(key)?.clone());
    }
    for (assignment, column) in assignments.iter().zip(computed) {
        place(&mut names, &mut columns, assignment.name().clone(), column);
    }
    with_groups_of(table, Table::try_with_len(names.into(), columns, table.nrows())?)
}

/// Replace the column called `name`, or append it.
pub(crate) fn place(
    names: &mut Vec<FieldName>,
    columns: &mut Vec<Column>,
    name: FieldName,
    column: Column,
) {
    match names.iter().position(|n| n == &name) {
        Some(idx) => columns[idx] = column,
        None => {
            names.push(name);
            columns.push(column);
        }
    }
}

fn with_groups_of(source: &Table, table: Table) -> TabulaResult<Table> {
    match source.group_index() {
        None => Ok(table),
        Some(index) => table.with_group_index(index.clone()),
    }
}

/// Evaluate the assignments into full-length columns, one per assignment.
fn evaluate_assignments(
    table: &Table,
    assignments: &[Assignment],
    options: &ExecutionOptions,
) -> TabulaResult<Vec<Column>> {
    check_references(table, assignments)?;
    check_not_grouping(table, assignments)?;

    let groups = match table.group_index() {
        Some(index) if !index.is_empty() => index,
        // ungrouped, or grouped without rows
        _ => return evaluate_in_scope(Scope::new(table), assignments),
    };
    let per_group = map_groups(table, options, |scope| {
        evaluate_in_scope(scope, assignments)
    })?;
    (0..assignments.len())
        .map(|position| {
            let pieces = groups
                .groups()
                .iter()
                .zip(per_group.iter())
                .map(|(group, columns)| (group.rows(), columns[position].clone()))
                .collect_vec();
            scatter(&pieces, table.nrows()).map_err(|err| {
                err.with_context(format!(
                    "combining the groups of {}",
                    assignments[position]
                ))
            })
        })
        .collect()
}

fn evaluate_in_scope(
    mut scope: Scope<'_>,
    assignments: &[Assignment],
) -> TabulaResult<Vec<Column>> {
    let mut columns = Vec::with_capacity(assignments.len());
    for assignment in assignments {
        let column = assignment.expr().evaluate(&scope)?;
        let column = match column.len() {
            len if len == scope.len() => column,
            1 => Column::constant(&column.scalar_at(0), scope.len()),
            len => tabula_bail!(
                Shape: "{} has length {}, expected {} or 1 (in scope of [{}])",
                assignment,
                len,
                scope.len(),
                DisplayFieldNames(scope.table().group_keys())
            ),
        };
        scope.bind(assignment.name().clone(), column.clone())?;
        columns.push(column);
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use tabula_dtype::{DType, FieldNames};
    use tabula_error::ErrorKind;
    use tabula_expr::{add, col, cumsum, gt, if_else, lit, mean, min_rank, mul, sub, sum};

    use super::*;
    use crate::assign;

    fn names(table: &Table) -> Vec<&str> {
        table.names().iter().map(|n| n.as_ref()).collect()
    }

    fn grouped() -> Table {
        Table::try_from_columns([
            ("g", Column::from(vec!["a", "b", "a", "b", "a"])),
            ("x", Column::from(vec![1i64, 10, 2, 20, 3])),
        ])
        .unwrap()
        .group_by_columns(FieldNames::from([FieldName::from("g")]))
        .unwrap()
    }

    #[test]
    fn sequential_assignments() {
        let table = Table::try_from_columns([("x", Column::from(vec![1i64, 2]))]).unwrap();
        let result = mutate(
            &table,
            &[
                assign("y", mul(col("x"), lit(2i64))),
                assign("z", add(col("y"), lit(1i64))),
            ],
        )
        .unwrap();
        assert_eq!(names(&result), vec!["x", "y", "z"]);
        assert_eq!(result.require("y").unwrap(), &Column::from(vec![2i64, 4]));
        assert_eq!(result.require("z").unwrap(), &Column::from(vec![3i64, 5]));
    }

    #[test]
    fn replaces_in_place() {
        let table = Table::try_from_columns([
            ("x", Column::from(vec![1i64, 2])),
            ("y", Column::from(vec![true, false])),
        ])
        .unwrap();
        let result = mutate(&table, &[assign("x", mul(col("x"), lit(0.5)))]).unwrap();
        assert_eq!(names(&result), vec!["x", "y"]);
        assert_eq!(result.require("x").unwrap(), &Column::from(vec![0.5, 1.0]));
    }

    #[test]
    fn grouped_windows_and_aggregates() {
        let result = mutate(
            &grouped(),
            &[
                assign("centered", sub(col("x"), mean(col("x")))),
                assign("running", cumsum(col("x"))),
                assign("rank", min_rank(col("x")).descending()),
                assign("total", sum(col("x"))),
            ],
        )
        .unwrap();
        assert_eq!(
            result.require("centered").unwrap(),
            &Column::from(vec![-1.0, -5.0, 0.0, 5.0, 1.0])
        );
        assert_eq!(
            result.require("running").unwrap(),
            &Column::from(vec![1i64, 10, 3, 30, 6])
        );
        assert_eq!(
            result.require("rank").unwrap(),
            &Column::from(vec![3i64, 2, 2, 1, 1])
        );
        assert_eq!(
            result.require("total").unwrap(),
            &Column::from(vec![6i64, 30, 6, 30, 6])
        );
        assert!(result.is_grouped());
    }

    #[test]
    fn per_group_dtypes_unify() {
        let result = mutate(
            &grouped(),
            &[assign(
                "v",
                if_else(gt(sum(col("x")), lit(10i64)), lit(0.5), lit(1i64)),
            )],
        )
        .unwrap();
        let v = result.require("v").unwrap();
        assert_eq!(v.dtype(), DType::Real);
        assert_eq!(v, &Column::from(vec![1.0, 0.5, 1.0, 0.5, 1.0]));
    }

    #[test]
    fn transmute_keeps_keys_and_new_columns() {
        let result = transmute(
            &grouped(),
            &[
                assign("double", mul(col("x"), lit(2i64))),
                assign("double", add(col("double"), lit(1i64))),
            ],
        )
        .unwrap();
        assert_eq!(names(&result), vec!["g", "double"]);
        assert_eq!(
            result.require("double").unwrap(),
            &Column::from(vec![3i64, 21, 5, 41, 7])
        );
    }

    #[test]
    fn errors() {
        let table = grouped();
        let kind = |assignments: Vec<Assignment>| mutate(&table, &assignments).unwrap_err().kind();
        assert_eq!(
            kind(vec![assign("y", col("z")), assign("z", col("x"))]),
            ErrorKind::Scope
        );
        assert_eq!(kind(vec![assign("y", col("w"))]), ErrorKind::Schema);
        assert_eq!(kind(vec![assign("g", lit("c"))]), ErrorKind::SemanticMisuse);
        assert_eq!(
            kind(vec![assign("y", if_else(gt(sum(col("x")), lit(10i64)), lit("s"), lit(1i64)))]),
            ErrorKind::Schema
        );
        let ungrouped = table.clone().ungrouped();
        assert_eq!(
            mutate(&ungrouped, &[assign("y", lit(1i64)), assign("z", col("x"))])
                .unwrap()
                .require("y")
                .unwrap(),
            &Column::from(vec![1i64; 5])
        );
    }
}
