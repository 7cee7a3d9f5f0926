//! Column validity: which slots hold a value and which are missing.

use arrow_buffer::BooleanBuffer;
use tabula_mask::Mask;

/// Validity information for a column.
///
/// Set bits mark present values; unset bits mark missing values.
#[derive(Clone, Debug)]
pub enum Validity {
    /// All items are present
    AllValid,
    /// All items are missing
    AllInvalid,
    /// Specified items are missing
    Array(BooleanBuffer),
}

impl Validity {
    /// Build a validity from a buffer, collapsing uniform buffers.
    pub fn from_buffer(buffer: BooleanBuffer) -> Self {
        let true_count = buffer.count_set_bits();
        if true_count == buffer.len() {
            Self::AllValid
        } else if true_count == 0 {
            Self::AllInvalid
        } else {
            Self::Array(buffer)
        }
    }

    /// Returns whether the `index` item is present.
    ///
    /// ## Panics
    ///
    /// Panics if the index is out of bounds of a buffer-backed validity.
    #[inline]
    pub fn is_valid(&self, index: usize) -> bool {
        match self {
            Self::AllValid => true,
            Self::AllInvalid => false,
            Self::Array(buffer) => buffer.value(index),
        }
    }

    #[inline]
    pub fn is_null(&self, index: usize) -> bool {
        !self.is_valid(index)
    }

    pub fn null_count(&self, length: usize) -> usize {
        match self {
            Self::AllValid => 0,
            Self::AllInvalid => length,
            Self::Array(buffer) => buffer.len() - buffer.count_set_bits(),
        }
    }

    /// Select the validity of the given positions, in order.
    pub fn take(&self, indices: &[usize]) -> Self {
        match self {
            Self::AllValid => Self::AllValid,
            Self::AllInvalid => Self::AllInvalid,
            Self::Array(buffer) => {
                Self::from_buffer(indices.iter().map(|&idx| buffer.value(idx)).collect())
            }
        }
    }

    /// The validity of a combination of two equal-length columns: present where both are.
    pub fn and(&self, rhs: &Validity) -> Self {
        match (self, rhs) {
            (Self::AllInvalid, _) | (_, Self::AllInvalid) => Self::AllInvalid,
            (Self::AllValid, other) | (other, Self::AllValid) => other.clone(),
            (Self::Array(lhs), Self::Array(rhs)) => Self::from_buffer(lhs & rhs),
        }
    }

    /// The positions holding a value.
    pub fn to_mask(&self, length: usize) -> Mask {
        match self {
            Self::AllValid => Mask::new_true(length),
            Self::AllInvalid => Mask::new_false(length),
            Self::Array(buffer) => Mask::from_buffer(buffer.clone()),
        }
    }

    pub fn to_buffer(&self, length: usize) -> BooleanBuffer {
        match self {
            Self::AllValid => BooleanBuffer::new_set(length),
            Self::AllInvalid => BooleanBuffer::new_unset(length),
            Self::Array(buffer) => buffer.clone(),
        }
    }
}

impl From<BooleanBuffer> for Validity {
    fn from(value: BooleanBuffer) -> Self {
        Self::from_buffer(value)
    }
}

impl FromIterator<bool> for Validity {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        Self::from_buffer(BooleanBuffer::from_iter(iter))
    }
}
