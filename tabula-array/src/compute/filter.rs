use tabula_error::{TabulaResult, tabula_bail};
use tabula_mask::{AllOr, Mask};

use crate::compute::take;
use crate::{Column, ColumnValues};

/// Keep the values of `column` where the mask is set.
pub fn filter(column: &Column, mask: &Mask) -> TabulaResult<Column> {
    if column.len() != mask.len() {
        tabula_bail!(
            Shape: "mask length {} does not match column length {}",
            mask.len(),
            column.len()
        );
    }
    Ok(match mask.indices() {
        AllOr::All => column.clone(),
        AllOr::None => take(column, &[]),
        AllOr::Some(indices) => take(column, indices),
    })
}

/// The positions of a Bool column holding `true`. Both `false` and missing are left out.
pub fn true_positions(column: &Column) -> TabulaResult<Mask> {
    let ColumnValues::Bool(values) = column.values() else {
        tabula_bail!(Schema: "expected a bool column, found {}", column.dtype());
    };
    Ok(&Mask::from_buffer(values.clone()) & &column.validity().to_mask(column.len()))
}
