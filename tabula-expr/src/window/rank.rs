use std::any::Any;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use itertools::Itertools;
use tabula_array::Column;
use tabula_array::compute::{SortColumn, compare_rows, sort_indices};
use tabula_error::{TabulaResult, tabula_bail};

use crate::window::evaluate_argument;
use crate::{ExprKind, ExprRef, Scope, TabulaExpr};

/// The ranking functions.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RankFunction {
    /// Position in sort order, ties broken by row position.
    RowNumber,
    /// Ties share the lowest rank, leaving gaps.
    MinRank,
    /// Ties share a rank, without gaps.
    DenseRank,
    /// `(min_rank - 1) / (n - 1)`, 0 when `n <= 1`.
    PercentRank,
    /// Proportion of values less than or equal to each value.
    CumeDist,
    /// Bucket number in `1..=k`.
    Ntile(u32),
}

impl RankFunction {
    fn name(self) -> &'static str {
        match self {
            Self::RowNumber => "row_number",
            Self::MinRank => "min_rank",
            Self::DenseRank => "dense_rank",
            Self::PercentRank => "percent_rank",
            Self::CumeDist => "cume_dist",
            Self::Ntile(_) => "ntile",
        }
    }
}

/// How missing values are ranked.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum MissingRank {
    /// Missing values get a missing rank and are not counted.
    #[default]
    Propagate,
    /// Missing values rank after every present value and tie with each other.
    Last,
}

#[derive(Debug, Clone, Eq)]
pub struct RankExpr {
    function: RankFunction,
    child: Option<ExprRef>,
    descending: bool,
    missing: MissingRank,
}

impl RankExpr {
    pub fn new(function: RankFunction, child: Option<ExprRef>) -> Self {
        Self {
            function,
            child,
            descending: false,
            missing: MissingRank::default(),
        }
    }

    /// Rank in descending order. Missing values still rank last.
    pub fn descending(mut self) -> Self {
        self.descending = true;
        self
    }

    pub fn missing(mut self, missing: MissingRank) -> Self {
        self.missing = missing;
        self
    }

    fn rank(&self, values: &Column) -> TabulaResult<Column> {
        let len = values.len();
        let order = sort_indices(&[SortColumn {
            column: values,
            descending: self.descending,
        }])?;
        // missing values sort last, so the ranked rows are a prefix of the order
        let ranked = match self.missing {
            MissingRank::Propagate => len - values.null_count(),
            MissingRank::Last => len,
        };
        let order = &order[..ranked];
        let ties =
            |a: usize, b: usize| compare_rows(values, a, b, self.descending).is_eq();

        // for each sorted position: its min rank, dense rank and the end of its tie block
        let mut min_ranks = Vec::with_capacity(ranked);
        let mut dense_ranks = Vec::with_capacity(ranked);
        let mut block_ends = vec![ranked; ranked];
        let mut block_start = 0;
        let mut dense = 0usize;
        for (pos, &row) in order.iter().enumerate() {
            if pos == 0 || !ties(order[pos - 1], row) {
                block_ends[block_start..pos].fill(pos);
                block_start = pos;
                dense += 1;
            }
            min_ranks.push(block_start + 1);
            dense_ranks.push(dense);
        }

        let n = ranked as f64;
        Ok(match self.function {
            RankFunction::RowNumber => scatter(len, order, |pos| Some(pos as i64 + 1)),
            RankFunction::MinRank => scatter(len, order, |pos| Some(min_ranks[pos] as i64)),
            RankFunction::DenseRank => scatter(len, order, |pos| Some(dense_ranks[pos] as i64)),
            RankFunction::PercentRank => scatter(len, order, |pos| {
                Some(if ranked <= 1 {
                    0.0
                } else {
                    (min_ranks[pos] - 1) as f64 / (n - 1.0)
                })
            }),
            RankFunction::CumeDist => {
                scatter(len, order, |pos| Some(block_ends[pos] as f64 / n))
            }
            RankFunction::Ntile(k) => scatter(len, order, |pos| {
                Some((u64::from(k) * pos as u64 / ranked as u64) as i64 + 1)
            }),
        })
    }
}

/// Place a value for each sorted position at its row; unranked rows stay missing.
fn scatter<T>(len: usize, order: &[usize], value: impl Fn(usize) -> Option<T>) -> Column
where
    Column: FromIterator<Option<T>>,
{
    let mut out: Vec<Option<T>> = (0..len).map(|_| None).collect();
    for (pos, &row) in order.iter().enumerate() {
        out[row] = value(pos);
    }
    out.into_iter().collect()
}

impl PartialEq for RankExpr {
    fn eq(&self, other: &RankExpr) -> bool {
        self.function == other.function
            && self.descending == other.descending
            && self.missing == other.missing
            && match (&self.child, &other.child) {
                (Some(a), Some(b)) => a.eq(b),
                (None, None) => true,
                _ => false,
            }
    }
}

impl Display for RankExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut args = Vec::new();
        if let Some(child) = &self.child {
            args.push(child.to_string());
        }
        if let RankFunction::Ntile(k) = self.function {
            args.push(k.to_string());
        }
        if self.descending {
            args.push("descending".to_string());
        }
        if self.missing == MissingRank::Last {
            args.push("missing_last".to_string());
        }
        write!(f, "{}({})", self.function.name(), args.iter().format(", "))
    }
}

impl TabulaExpr for RankExpr {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn evaluate(&self, scope: &Scope<'_>) -> TabulaResult<Column> {
        if self.function == RankFunction::Ntile(0) {
            tabula_bail!("ntile needs at least one bucket");
        }
        match &self.child {
            None => Ok((1..=scope.len() as i64).map(Some).collect()),
            Some(child) => self.rank(&evaluate_argument(self.function.name(), child, scope)?),
        }
    }

    fn children(&self) -> Vec<&ExprRef> {
        self.child.iter().collect()
    }

    fn kind(&self) -> ExprKind {
        ExprKind::Window
    }
}

impl From<RankExpr> for ExprRef {
    fn from(value: RankExpr) -> Self {
        Arc::new(value)
    }
}

/// Row positions `1..=n` of the scope.
pub fn row_number() -> RankExpr {
    RankExpr::new(RankFunction::RowNumber, None)
}

/// Rank by `child`, breaking ties by row position.
pub fn row_number_by(child: impl Into<ExprRef>) -> RankExpr {
    RankExpr::new(RankFunction::RowNumber, Some(child.into()))
}

pub fn min_rank(child: impl Into<ExprRef>) -> RankExpr {
    RankExpr::new(RankFunction::MinRank, Some(child.into()))
}

pub fn dense_rank(child: impl Into<ExprRef>) -> RankExpr {
    RankExpr::new(RankFunction::DenseRank, Some(child.into()))
}

pub fn percent_rank(child: impl Into<ExprRef>) -> RankExpr {
    RankExpr::new(RankFunction::PercentRank, Some(child.into()))
}

pub fn cume_dist(child: impl Into<ExprRef>) -> RankExpr {
    RankExpr::new(RankFunction::CumeDist, Some(child.into()))
}

/// Split the scope into `k` buckets of nearly equal size, by the order of `child`.
pub fn ntile(child: impl Into<ExprRef>, k: u32) -> RankExpr {
    RankExpr::new(RankFunction::Ntile(k), Some(child.into()))
}
