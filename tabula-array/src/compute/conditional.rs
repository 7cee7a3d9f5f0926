use std::cmp::Ordering;

use itertools::Itertools;
use tabula_dtype::DType;
use tabula_error::{TabulaResult, tabula_bail};
use tabula_scalar::Scalar;

use crate::compute::{broadcast_idx, broadcast_len};
use crate::{Column, ColumnBuilder};

/// Whether each value is missing. The result is never missing.
pub fn is_null(column: &Column) -> Column {
    (0..column.len())
        .map(|idx| Some(!column.is_valid(idx)))
        .collect()
}

/// Whether each value occurs in `set`. The result is never missing: a missing value matches
/// when the set holds a missing value, and numbers match across Integer and Real.
pub fn is_in(column: &Column, set: &[Scalar]) -> Column {
    column
        .scalars()
        .map(|value| Some(set.iter().any(|candidate| same_value(&value, candidate))))
        .collect()
}

fn same_value(lhs: &Scalar, rhs: &Scalar) -> bool {
    match (lhs.value(), rhs.value()) {
        (None, None) => true,
        (Some(a), Some(b)) => a.cmp_sort(b) == Some(Ordering::Equal),
        _ => false,
    }
}

/// Choose between `if_true` and `if_false` by a Bool condition; a missing condition yields a
/// missing value.
pub fn if_else(condition: &Column, if_true: &Column, if_false: &Column) -> TabulaResult<Column> {
    if condition.dtype() != DType::Bool {
        tabula_bail!(Schema: "if_else condition must be bool, found {}", condition.dtype());
    }
    let dtype = if_true.dtype().unify(&if_false.dtype())?;
    let len = broadcast_len(
        broadcast_len(condition.len(), if_true.len())?,
        if_false.len(),
    )?;
    let mut builder = ColumnBuilder::with_capacity(dtype, len);
    for idx in 0..len {
        match condition
            .scalar_at(broadcast_idx(condition.len(), idx))
            .as_bool()
        {
            Some(true) => {
                builder.append_scalar(&if_true.scalar_at(broadcast_idx(if_true.len(), idx)))?
            }
            Some(false) => {
                builder.append_scalar(&if_false.scalar_at(broadcast_idx(if_false.len(), idx)))?
            }
            None => builder.append_null(),
        }
    }
    Ok(builder.finish())
}

/// The first present value across `columns`, row by row.
pub fn coalesce(columns: &[Column]) -> TabulaResult<Column> {
    let Some((first, rest)) = columns.split_first() else {
        tabula_bail!("coalesce needs at least one argument");
    };
    let dtype = rest
        .iter()
        .try_fold(first.dtype(), |dtype, c| dtype.unify(&c.dtype()))?;
    let len = rest
        .iter()
        .try_fold(first.len(), |len, c| broadcast_len(len, c.len()))?;
    let mut builder = ColumnBuilder::with_capacity(dtype, len);
    for idx in 0..len {
        let value = columns
            .iter()
            .map(|c| c.scalar_at(broadcast_idx(c.len(), idx)))
            .find_or_last(Scalar::is_valid);
        match value {
            Some(scalar) => builder.append_scalar(&scalar)?,
            None => builder.append_null(),
        }
    }
    Ok(builder.finish())
}
