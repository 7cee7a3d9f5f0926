//! Row selection masks.
//!
//! A [`Mask`] marks which of a table's rows a filter keeps. Uniform masks are stored as just a
//! length; mixed masks keep their bits and compute the kept positions on first use.
#![deny(missing_docs)]
mod bitand;

use std::sync::{Arc, OnceLock};

use arrow_buffer::BooleanBuffer;

/// A view of a mask that is either uniform or holds a mixed representation `T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllOr<T> {
    /// Every row is kept.
    All,
    /// No row is kept.
    None,
    /// Some rows are kept.
    Some(T),
}

/// Which rows of a table are kept.
#[derive(Clone, Debug)]
pub enum Mask {
    /// All `len` rows are kept.
    AllTrue(usize),
    /// None of the `len` rows are kept.
    AllFalse(usize),
    /// Some rows are kept.
    Values(Arc<MaskValues>),
}

/// The bits of a mixed [`Mask`].
#[derive(Debug)]
pub struct MaskValues {
    buffer: BooleanBuffer,
    true_count: usize,
    positions: OnceLock<Vec<usize>>,
}

impl MaskValues {
    /// The set bits, one per row.
    pub fn boolean_buffer(&self) -> &BooleanBuffer {
        &self.buffer
    }

    /// The positions of the set bits, in ascending order.
    pub fn indices(&self) -> &[usize] {
        self.positions.get_or_init(|| self.buffer.set_indices().collect())
    }
}

impl Mask {
    /// A mask keeping all `len` rows.
    pub fn new_true(len: usize) -> Self {
        Self::AllTrue(len)
    }

    /// A mask keeping none of `len` rows.
    pub fn new_false(len: usize) -> Self {
        Self::AllFalse(len)
    }

    /// A mask keeping the rows whose bit is set.
    pub fn from_buffer(buffer: BooleanBuffer) -> Self {
        let len = buffer.len();
        match buffer.count_set_bits() {
            0 => Self::AllFalse(len),
            true_count if true_count == len => Self::AllTrue(len),
            true_count => Self::Values(Arc::new(MaskValues {
                buffer,
                true_count,
                positions: OnceLock::new(),
            })),
        }
    }

    /// The number of rows the mask covers, kept or not.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        match self {
            Self::AllTrue(len) | Self::AllFalse(len) => *len,
            Self::Values(values) => values.buffer.len(),
        }
    }

    /// The number of kept rows.
    pub fn true_count(&self) -> usize {
        match self {
            Self::AllTrue(len) => *len,
            Self::AllFalse(_) => 0,
            Self::Values(values) => values.true_count,
        }
    }

    /// Whether no row is kept.
    pub fn all_false(&self) -> bool {
        self.true_count() == 0
    }

    /// The mask as bits.
    pub fn boolean_buffer(&self) -> AllOr<&BooleanBuffer> {
        match self {
            Self::AllTrue(_) => AllOr::All,
            Self::AllFalse(_) => AllOr::None,
            Self::Values(values) => AllOr::Some(&values.buffer),
        }
    }

    /// The mask as ascending kept positions.
    pub fn indices(&self) -> AllOr<&[usize]> {
        match self {
            Self::AllTrue(_) => AllOr::All,
            Self::AllFalse(_) => AllOr::None,
            Self::Values(values) => AllOr::Some(values.indices()),
        }
    }

    /// The kept positions as an owned vector.
    pub fn to_indices(&self) -> Vec<usize> {
        match self.indices() {
            AllOr::All => (0..self.len()).collect(),
            AllOr::None => Vec::new(),
            AllOr::Some(indices) => indices.to_vec(),
        }
    }
}

impl From<BooleanBuffer> for Mask {
    fn from(value: BooleanBuffer) -> Self {
        Self::from_buffer(value)
    }
}

impl FromIterator<bool> for Mask {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        Self::from_buffer(BooleanBuffer::from_iter(iter))
    }
}
