use std::fmt::{Display, Formatter};

use tabula_error::TabulaResult;

use crate::Column;
use crate::compute::binary_map;

/// Element-wise logical operators, following Kleene's three-valued logic.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BooleanOperator {
    /// `false` if either side is `false`, missing if either side is missing, else `true`.
    And,
    /// `true` if either side is `true`, missing if either side is missing, else `false`.
    Or,
}

impl Display for BooleanOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::And => f.write_str("&"),
            Self::Or => f.write_str("|"),
        }
    }
}

pub fn and_kleene(lhs: &Column, rhs: &Column) -> TabulaResult<Column> {
    binary_boolean(lhs, rhs, BooleanOperator::And)
}

pub fn or_kleene(lhs: &Column, rhs: &Column) -> TabulaResult<Column> {
    binary_boolean(lhs, rhs, BooleanOperator::Or)
}

pub fn binary_boolean(lhs: &Column, rhs: &Column, op: BooleanOperator) -> TabulaResult<Column> {
    let l = lhs.bool_iter()?.collect::<Vec<_>>();
    let r = rhs.bool_iter()?.collect::<Vec<_>>();
    let result = binary_map(&l, &r, |a, b| match op {
        BooleanOperator::And => kleene_and(*a, *b),
        BooleanOperator::Or => kleene_or(*a, *b),
    })?;
    Ok(result.into_iter().collect())
}

/// Logical negation; missing stays missing.
pub fn invert(column: &Column) -> TabulaResult<Column> {
    Ok(column.bool_iter()?.map(|v| v.map(|b| !b)).collect())
}

pub fn kleene_and(lhs: Option<bool>, rhs: Option<bool>) -> Option<bool> {
    match (lhs, rhs) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    }
}

pub fn kleene_or(lhs: Option<bool>, rhs: Option<bool>) -> Option<bool> {
    match (lhs, rhs) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    }
}
