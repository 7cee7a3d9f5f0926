use std::ops::BitAnd;

use tabula_error::tabula_panic;

use crate::{AllOr, Mask};

/// The rows kept by both masks.
impl BitAnd for &Mask {
    type Output = Mask;

    fn bitand(self, rhs: Self) -> Self::Output {
        if self.len() != rhs.len() {
            tabula_panic!(
                "cannot intersect masks of lengths {} and {}",
                self.len(),
                rhs.len()
            );
        }
        match (self.boolean_buffer(), rhs.boolean_buffer()) {
            (AllOr::None, _) | (_, AllOr::None) => Mask::new_false(self.len()),
            (AllOr::All, _) => rhs.clone(),
            (_, AllOr::All) => self.clone(),
            (AllOr::Some(lhs), AllOr::Some(rhs)) => Mask::from_buffer(lhs & rhs),
        }
    }
}
