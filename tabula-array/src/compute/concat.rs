use tabula_error::{TabulaResult, tabula_bail, tabula_err};

use crate::compute::take;
use crate::{Column, ColumnBuilder};

/// Concatenate columns end to end.
///
/// The result dtype unifies the input dtypes: Integer and Real unify to Real, any other mix of
/// dtypes is a schema error.
pub fn concat(columns: &[Column]) -> TabulaResult<Column> {
    let Some((first, rest)) = columns.split_first() else {
        tabula_bail!("cannot concatenate zero columns");
    };
    let dtype = rest
        .iter()
        .try_fold(first.dtype(), |dtype, c| dtype.unify(&c.dtype()))?;
    if rest.is_empty() {
        return Ok(first.clone());
    }
    let len = columns.iter().map(Column::len).sum();
    let mut builder = ColumnBuilder::with_capacity(dtype, len);
    for column in columns {
        builder.extend_from_column(column)?;
    }
    Ok(builder.finish())
}

/// Assemble a column of length `len` from pieces, each written to its own set of row positions.
///
/// Every position in `0..len` must be covered by exactly one piece.
pub fn scatter(pieces: &[(&[usize], Column)], len: usize) -> TabulaResult<Column> {
    let mut source = vec![None; len];
    let mut offset = 0;
    for (rows, column) in pieces {
        if rows.len() != column.len() {
            tabula_bail!(
                Shape: "piece of length {} scattered to {} rows",
                column.len(),
                rows.len()
            );
        }
        for (k, &row) in rows.iter().enumerate() {
            let Some(slot) = source.get_mut(row) else {
                tabula_bail!(OutOfBounds: row, 0, len);
            };
            if slot.is_some() {
                tabula_bail!("row {} is written by more than one piece", row);
            }
            *slot = Some(offset + k);
        }
        offset += rows.len();
    }
    let indices = source
        .into_iter()
        .enumerate()
        .map(|(row, idx)| idx.ok_or_else(|| tabula_err!("row {} is not written by any piece", row)))
        .collect::<TabulaResult<Vec<_>>>()?;
    let columns = pieces.iter().map(|(_, c)| c.clone()).collect::<Vec<_>>();
    Ok(take(&concat(&columns)?, &indices))
}
