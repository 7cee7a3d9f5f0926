//! Window functions: one output row per input row, computed from the ordered rows of the scope.

mod cumulative;
mod offset;
mod rank;

pub use cumulative::*;
pub use offset::*;
pub use rank::*;
use tabula_array::Column;
use tabula_error::{TabulaResult, tabula_bail};

use crate::{ExprKind, ExprRef, Scope, TabulaExprExt};

/// Evaluate the argument of a window function, aligned to the rows of the scope.
///
/// A length-1 result is broadcast when it comes from a row-independent expression such as a
/// literal. An argument that reduces the scope through an aggregate cannot be ordered and is
/// rejected.
pub(crate) fn evaluate_argument(
    function: &str,
    argument: &ExprRef,
    scope: &Scope<'_>,
) -> TabulaResult<Column> {
    let column = argument.evaluate(scope)?;
    if column.len() == scope.len() {
        return Ok(column);
    }
    if column.len() != 1 {
        tabula_bail!(
            Shape: "argument {} of {} has length {}, expected {}",
            argument,
            function,
            column.len(),
            scope.len()
        );
    }
    if argument.contains_kind(ExprKind::Aggregate) {
        tabula_bail!(
            SemanticMisuse: "argument {} of {} is an aggregate, window functions need one value per row",
            argument,
            function
        );
    }
    Ok(Column::constant(&column.scalar_at(0), scope.len()))
}
