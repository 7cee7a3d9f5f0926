use tabula_dtype::DType;
use tabula_error::TabulaResult;

use crate::{Column, ColumnBuilder};

/// Convert a column to another dtype.
///
/// Values without a sensible conversion become missing, see [`tabula_scalar::Scalar::cast`].
pub fn cast(column: &Column, dtype: DType) -> TabulaResult<Column> {
    if column.dtype() == dtype {
        return Ok(column.clone());
    }
    let mut builder = ColumnBuilder::with_capacity(dtype, column.len());
    for scalar in column.scalars() {
        builder.append_scalar(&scalar.cast(dtype))?;
    }
    Ok(builder.finish())
}
