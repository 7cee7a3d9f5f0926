//! Compute kernels over [`Column`](crate::Column)s.
//!
//! Binary kernels accept operands of equal length, or a length-1 operand which is broadcast
//! against the other side.

pub use boolean::*;
pub use cast::*;
pub use compare::*;
pub use concat::*;
pub use conditional::*;
pub use filter::*;
pub use numeric::*;
pub use sort::*;
pub use take::*;
use tabula_error::{TabulaResult, tabula_bail};

mod boolean;
mod cast;
mod compare;
mod concat;
mod conditional;
mod filter;
mod numeric;
mod sort;
mod take;

/// The length of the result of combining operands of length `lhs` and `rhs`.
pub fn broadcast_len(lhs: usize, rhs: usize) -> TabulaResult<usize> {
    match (lhs, rhs) {
        (l, r) if l == r => Ok(l),
        (1, r) => Ok(r),
        (l, 1) => Ok(l),
        (l, r) => tabula_bail!(Shape: "cannot combine operands of length {} and {}", l, r),
    }
}

#[inline]
pub(crate) fn broadcast_idx(len: usize, idx: usize) -> usize {
    if len == 1 { 0 } else { idx }
}

/// Apply `f` element-wise over two broadcast-compatible slices.
pub(crate) fn binary_map<A, B, O>(
    lhs: &[A],
    rhs: &[B],
    mut f: impl FnMut(&A, &B) -> O,
) -> TabulaResult<Vec<O>> {
    let len = broadcast_len(lhs.len(), rhs.len())?;
    Ok((0..len)
        .map(|idx| {
            f(
                &lhs[broadcast_idx(lhs.len(), idx)],
                &rhs[broadcast_idx(rhs.len(), idx)],
            )
        })
        .collect())
}
