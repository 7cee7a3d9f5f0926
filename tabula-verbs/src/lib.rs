//! The verbs of Tabula and the pipelines that chain them.
//!
//! Every verb takes a [`Table`] by reference and returns a new one, sharing the columns it does
//! not touch. Verbs that evaluate expressions run them once per group when the table is
//! grouped; see [`ExecutionOptions`] for how the groups are scheduled.

use tabula_array::Table;
use tabula_error::TabulaResult;
use tabula_expr::ExprRef;

mod arrange;
mod assignment;
mod executor;
mod filter;
mod group_by;
mod mutate;
mod options;
pub mod pipeline;
mod select;
mod summarise;

pub use arrange::*;
pub use assignment::{Assignment, assign};
pub use filter::*;
pub use group_by::*;
pub use mutate::{mutate, mutate_with, transmute, transmute_with};
pub use options::*;
pub use pipeline::{Pipeline, Step};
pub use select::*;
pub use summarise::*;

/// Chain verbs directly on a table: `table.filter(..)?.mutate(..)?`.
pub trait TableVerbs: Sized {
    fn filter<I>(&self, predicates: I) -> TabulaResult<Table>
    where
        I: IntoIterator,
        I::Item: Into<ExprRef>;

    fn arrange<I>(&self, keys: I) -> TabulaResult<Table>
    where
        I: IntoIterator,
        I::Item: Into<SortKey>;

    fn select<I>(&self, selectors: I) -> TabulaResult<Table>
    where
        I: IntoIterator,
        I::Item: Into<Selector>;

    fn rename<I>(&self, renames: I) -> TabulaResult<Table>
    where
        I: IntoIterator<Item = Selector>;

    fn mutate<I>(&self, assignments: I) -> TabulaResult<Table>
    where
        I: IntoIterator<Item = Assignment>;

    fn transmute<I>(&self, assignments: I) -> TabulaResult<Table>
    where
        I: IntoIterator<Item = Assignment>;

    fn summarise<I>(&self, summaries: I) -> TabulaResult<Table>
    where
        I: IntoIterator<Item = Assignment>;

    fn group_by<I>(&self, keys: I) -> TabulaResult<Table>
    where
        I: IntoIterator,
        I::Item: Into<GroupKey>;

    fn ungroup(&self) -> Table;
}

impl TableVerbs for Table {
    fn filter<I>(&self, predicates: I) -> TabulaResult<Table>
    where
        I: IntoIterator,
        I::Item: Into<ExprRef>,
    {
        filter(self, &predicates.into_iter().map(Into::into).collect::<Vec<_>>())
    }

    fn arrange<I>(&self, keys: I) -> TabulaResult<Table>
    where
        I: IntoIterator,
        I::Item: Into<SortKey>,
    {
        arrange(self, &keys.into_iter().map(Into::into).collect::<Vec<_>>())
    }

    fn select<I>(&self, selectors: I) -> TabulaResult<Table>
    where
        I: IntoIterator,
        I::Item: Into<Selector>,
    {
        select(self, &selectors.into_iter().map(Into::into).collect::<Vec<_>>())
    }

    fn rename<I>(&self, renames: I) -> TabulaResult<Table>
    where
        I: IntoIterator<Item = Selector>,
    {
        rename(self, &renames.into_iter().collect::<Vec<_>>())
    }

    fn mutate<I>(&self, assignments: I) -> TabulaResult<Table>
    where
        I: IntoIterator<Item = Assignment>,
    {
        mutate(self, &assignments.into_iter().collect::<Vec<_>>())
    }

    fn transmute<I>(&self, assignments: I) -> TabulaResult<Table>
    where
        I: IntoIterator<Item = Assignment>,
    {
        transmute(self, &assignments.into_iter().collect::<Vec<_>>())
    }

    fn summarise<I>(&self, summaries: I) -> TabulaResult<Table>
    where
        I: IntoIterator<Item = Assignment>,
    {
        summarise(self, &summaries.into_iter().collect::<Vec<_>>())
    }

    fn group_by<I>(&self, keys: I) -> TabulaResult<Table>
    where
        I: IntoIterator,
        I::Item: Into<GroupKey>,
    {
        group_by(self, &keys.into_iter().map(Into::into).collect::<Vec<_>>())
    }

    fn ungroup(&self) -> Table {
        ungroup(self)
    }
}

#[cfg(test)]
mod tests {
    use tabula_array::Column;
    use tabula_expr::{col, gt, lit, n};

    use super::*;

    #[test]
    fn chaining() {
        let table = Table::try_from_columns([
            ("g", Column::from(vec!["a", "b", "a"])),
            ("x", Column::from(vec![1i64, 2, 3])),
        ])
        .unwrap();
        let result = table
            .filter([gt(col("x"), lit(1i64))])
            .unwrap()
            .group_by(["g"])
            .unwrap()
            .summarise([assign("count", n())])
            .unwrap();
        assert_eq!(result.require("count").unwrap(), &Column::from(vec![1i64, 1]));
        assert_eq!(result.require("g").unwrap(), &Column::from(vec!["b", "a"]));
    }
}
