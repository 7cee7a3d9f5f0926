//! A recorded sequence of verbs, executed left to right against a table.

use std::fmt::{Display, Formatter};

use itertools::Itertools;
use tabula_array::Table;
use tabula_error::{ResultExt, TabulaResult};
use tabula_expr::ExprRef;

use crate::{
    ArrangeOptions, Assignment, ExecutionOptions, GroupKey, Selector, SortKey, arrange_with,
    filter_with, group_by, mutate_with, rename, select, summarise_with, transmute_with, ungroup,
};

/// One verb of a [`Pipeline`] with its arguments.
#[derive(Debug, Clone)]
pub enum Step {
    Filter(Vec<ExprRef>),
    Arrange(Vec<SortKey>, ArrangeOptions),
    Select(Vec<Selector>),
    Rename(Vec<Selector>),
    Mutate(Vec<Assignment>),
    Transmute(Vec<Assignment>),
    Summarise(Vec<Assignment>),
    GroupBy(Vec<GroupKey>),
    Ungroup,
}

impl Step {
    fn apply(&self, table: &Table, options: &ExecutionOptions) -> TabulaResult<Table> {
        match self {
            Self::Filter(predicates) => filter_with(table, predicates, options),
            Self::Arrange(keys, arrange_options) => arrange_with(table, keys, arrange_options),
            Self::Select(selectors) => select(table, selectors),
            Self::Rename(renames) => rename(table, renames),
            Self::Mutate(assignments) => mutate_with(table, assignments, options),
            Self::Transmute(assignments) => transmute_with(table, assignments, options),
            Self::Summarise(summaries) => summarise_with(table, summaries, options),
            Self::GroupBy(keys) => group_by(table, keys),
            Self::Ungroup => Ok(ungroup(table)),
        }
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Filter(predicates) => write!(f, "filter({})", predicates.iter().format(", ")),
            Self::Arrange(keys, options) => {
                write!(f, "arrange({}", keys.iter().format(", "))?;
                if options.by_group {
                    write!(f, ", by_group")?;
                }
                write!(f, ")")
            }
            Self::Select(selectors) => write!(f, "select({})", selectors.iter().format(", ")),
            Self::Rename(renames) => write!(f, "rename({})", renames.iter().format(", ")),
            Self::Mutate(assignments) => {
                write!(f, "mutate({})", assignments.iter().format(", "))
            }
            Self::Transmute(assignments) => {
                write!(f, "transmute({})", assignments.iter().format(", "))
            }
            Self::Summarise(summaries) => {
                write!(f, "summarise({})", summaries.iter().format(", "))
            }
            Self::GroupBy(keys) => write!(f, "group_by({})", keys.iter().format(", ")),
            Self::Ungroup => write!(f, "ungroup()"),
        }
    }
}

/// A table and the verbs to apply to it.
///
/// Building a pipeline only records steps; nothing is evaluated until [`Pipeline::execute`].
/// The input table is never modified, so it remains usable whatever the outcome.
///
/// ```
/// use tabula_array::{Column, Table};
/// use tabula_expr::{col, gt, lit, n};
/// use tabula_verbs::{Pipeline, assign};
///
/// let table = Table::try_from_columns([
///     ("g", Column::from(vec!["a", "b", "a"])),
///     ("x", Column::from(vec![1i64, 2, 3])),
/// ])
/// .unwrap();
/// let result = Pipeline::new(table)
///     .filter([gt(col("x"), lit(1i64))])
///     .group_by(["g"])
///     .summarise([assign("count", n())])
///     .execute()
///     .unwrap();
/// assert_eq!(result.nrows(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    table: Table,
    steps: Vec<Step>,
    options: ExecutionOptions,
}

impl Pipeline {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            steps: Vec::new(),
            options: ExecutionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ExecutionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn then(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn filter<I>(self, predicates: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ExprRef>,
    {
        self.then(Step::Filter(predicates.into_iter().map(Into::into).collect()))
    }

    pub fn arrange<I>(self, keys: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SortKey>,
    {
        self.arrange_with(keys, ArrangeOptions::default())
    }

    pub fn arrange_with<I>(self, keys: I, options: ArrangeOptions) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SortKey>,
    {
        self.then(Step::Arrange(
            keys.into_iter().map(Into::into).collect(),
            options,
        ))
    }

    pub fn select<I>(self, selectors: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Selector>,
    {
        self.then(Step::Select(selectors.into_iter().map(Into::into).collect()))
    }

    pub fn rename<I>(self, renames: I) -> Self
    where
        I: IntoIterator<Item = Selector>,
    {
        self.then(Step::Rename(renames.into_iter().collect()))
    }

    pub fn mutate<I>(self, assignments: I) -> Self
    where
        I: IntoIterator<Item = Assignment>,
    {
        self.then(Step::Mutate(assignments.into_iter().collect()))
    }

    pub fn transmute<I>(self, assignments: I) -> Self
    where
        I: IntoIterator<Item = Assignment>,
    {
        self.then(Step::Transmute(assignments.into_iter().collect()))
    }

    pub fn summarise<I>(self, summaries: I) -> Self
    where
        I: IntoIterator<Item = Assignment>,
    {
        self.then(Step::Summarise(summaries.into_iter().collect()))
    }

    pub fn group_by<I>(self, keys: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<GroupKey>,
    {
        self.then(Step::GroupBy(keys.into_iter().map(Into::into).collect()))
    }

    pub fn ungroup(self) -> Self {
        self.then(Step::Ungroup)
    }

    /// Run every step in order. An error names the step that raised it.
    pub fn execute(self) -> TabulaResult<Table> {
        let Self {
            table,
            steps,
            options,
        } = self;
        steps
            .iter()
            .enumerate()
            .try_fold(table, |table, (position, step)| {
                log::trace!(
                    "pipeline step {} of {}: {} on {} rows",
                    position + 1,
                    steps.len(),
                    step,
                    table.nrows()
                );
                step.apply(&table, &options)
                    .with_context(|| format!("in pipeline step {} ({step})", position + 1))
            })
    }
}

#[cfg(test)]
mod tests {
    use tabula_array::Column;
    use tabula_error::ErrorKind;
    use tabula_expr::{col, gt, lit, mul, sum};

    use super::*;
    use crate::assign;

    fn table() -> Table {
        Table::try_from_columns([
            ("g", Column::from(vec!["a", "b", "a", "b"])),
            ("x", Column::from(vec![4i64, 3, 2, 1])),
        ])
        .unwrap()
    }

    #[test]
    fn runs_steps_in_order() {
        let pipeline = Pipeline::new(table())
            .filter([gt(col("x"), lit(1i64))])
            .mutate([assign("y", mul(col("x"), lit(10i64)))])
            .group_by(["g"])
            .summarise([assign("total", sum(col("y")))])
            .arrange([SortKey::asc(col("total"))]);
        assert_eq!(pipeline.steps().len(), 5);
        let result = pipeline.execute().unwrap();
        assert_eq!(result.require("g").unwrap(), &Column::from(vec!["b", "a"]));
        assert_eq!(result.require("total").unwrap(), &Column::from(vec![30i64, 60]));
    }

    #[test]
    fn serial_and_parallel_agree() {
        let pipeline = Pipeline::new(table())
            .group_by(["g"])
            .mutate([assign("share", mul(col("x"), sum(col("x"))))]);
        let serial = pipeline
            .clone()
            .with_options(ExecutionOptions::serial())
            .execute()
            .unwrap();
        let parallel = pipeline
            .with_options(ExecutionOptions::default().with_min_parallel_groups(2))
            .execute()
            .unwrap();
        assert_eq!(serial, parallel);
    }

    #[test]
    fn errors_name_the_failing_step() {
        let original = table();
        let err = Pipeline::new(original.clone())
            .ungroup()
            .filter([col("x")])
            .execute()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert!(err.to_string().starts_with("in pipeline step 2 (filter(x))"));
        assert_eq!(original, table());
    }

    #[test]
    fn step_display() {
        let pipeline = Pipeline::new(table())
            .arrange_with([SortKey::desc(col("x"))], ArrangeOptions::by_group())
            .select(["x"])
            .group_by(["g"])
            .ungroup();
        let steps = pipeline.steps().iter().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(
            steps,
            vec!["arrange(desc(x), by_group)", "select(x)", "group_by(g)", "ungroup()"]
        );
    }
}
