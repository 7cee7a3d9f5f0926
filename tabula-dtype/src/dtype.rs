use std::fmt::{Display, Formatter};

use tabula_error::{TabulaResult, tabula_bail};

/// The logical types of elements in Tabula columns.
///
/// Every column is nullable: a missing value is tracked by the column's validity, never by its
/// type. A column keeps a single [`DType`] for its entire length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DType {
    /// Boolean values, `true` or `false`.
    Bool,
    /// 64-bit signed integers.
    Integer,
    /// 64-bit IEEE-754 floating point numbers.
    Real,
    /// UTF-8 strings.
    Text,
}

impl DType {
    /// Check if `self` is an integer.
    pub fn is_integer(&self) -> bool {
        matches!(self, DType::Integer)
    }

    /// Check if `self` is a floating point number.
    pub fn is_real(&self) -> bool {
        matches!(self, DType::Real)
    }

    /// Check if `self` is an integer or a floating point number.
    pub fn is_numeric(&self) -> bool {
        matches!(self, DType::Integer | DType::Real)
    }

    /// Check if `self` is a boolean.
    pub fn is_boolean(&self) -> bool {
        matches!(self, DType::Bool)
    }

    /// Check if `self` is a string.
    pub fn is_text(&self) -> bool {
        matches!(self, DType::Text)
    }

    /// The type both operands of a numeric operation are promoted to.
    ///
    /// Integer combined with Real promotes to Real. Returns `None` if either side is not numeric.
    pub fn numeric_supertype(&self, other: &DType) -> Option<DType> {
        match (self, other) {
            (DType::Integer, DType::Integer) => Some(DType::Integer),
            (DType::Integer | DType::Real, DType::Integer | DType::Real) => Some(DType::Real),
            _ => None,
        }
    }

    /// The type that values of both `self` and `other` can be stored as without loss of meaning.
    ///
    /// Equal types unify to themselves, numeric types unify through
    /// [`DType::numeric_supertype`], anything else is a schema error.
    pub fn unify(&self, other: &DType) -> TabulaResult<DType> {
        if self == other {
            return Ok(*self);
        }
        match self.numeric_supertype(other) {
            Some(dtype) => Ok(dtype),
            None => tabula_bail!(Schema: "cannot combine values of type {} and {}", self, other),
        }
    }
}

impl Display for DType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DType::Bool => write!(f, "bool"),
            DType::Integer => write!(f, "int"),
            DType::Real => write!(f, "real"),
            DType::Text => write!(f, "text"),
        }
    }
}
