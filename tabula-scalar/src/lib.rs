//! Single typed values, possibly missing.
//!
//! A [`Scalar`] is what an expression literal holds, what an aggregate reduces a group to, and
//! what a group key tuple is made of.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub use scalar_type::ScalarType;
use tabula_dtype::DType;
use tabula_error::{TabulaResult, tabula_bail};
pub use value::*;

mod cast;
mod display;
mod scalar_type;
mod value;

/// A single logical item, composed of both an optional [`ScalarValue`] and a logical [`DType`].
///
/// Equality and hashing are *grouping* equality: two missing values of the same dtype are equal,
/// `NaN` equals `NaN` and `-0.0` equals `0.0`. Ordering through [`Scalar::cmp_missing_last`]
/// places missing values after every present value.
#[derive(Debug, Clone)]
pub struct Scalar {
    dtype: DType,
    value: Option<ScalarValue>,
}

impl Scalar {
    /// Create a scalar, checking that the value matches the dtype.
    pub fn try_new(dtype: DType, value: Option<ScalarValue>) -> TabulaResult<Self> {
        if let Some(v) = &value {
            if v.dtype() != dtype {
                tabula_bail!(Schema: "value {} does not match dtype {}", v, dtype);
            }
        }
        Ok(Self { dtype, value })
    }

    /// A missing value of the given dtype.
    pub fn null(dtype: DType) -> Self {
        Self { dtype, value: None }
    }

    /// A present value; the dtype is taken from the value.
    pub fn from_value(value: ScalarValue) -> Self {
        Self {
            dtype: value.dtype(),
            value: Some(value),
        }
    }

    /// A boolean scalar.
    pub fn bool(value: bool) -> Self {
        Self::from_value(ScalarValue::Bool(value))
    }

    /// An integer scalar.
    pub fn integer(value: i64) -> Self {
        Self::from_value(ScalarValue::Integer(value))
    }

    /// A real scalar.
    pub fn real(value: f64) -> Self {
        Self::from_value(ScalarValue::Real(value))
    }

    /// A text scalar.
    pub fn text(value: impl Into<Arc<str>>) -> Self {
        Self::from_value(ScalarValue::Text(value.into()))
    }

    #[inline]
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    #[inline]
    pub fn value(&self) -> Option<&ScalarValue> {
        self.value.as_ref()
    }

    #[inline]
    pub fn into_value(self) -> Option<ScalarValue> {
        self.value
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            Some(ScalarValue::Bool(b)) => Some(b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.value {
            Some(ScalarValue::Integer(i)) => Some(i),
            _ => None,
        }
    }

    /// The value as a float; integers are converted.
    pub fn as_f64(&self) -> Option<f64> {
        match self.value {
            Some(ScalarValue::Integer(i)) => Some(i as f64),
            Some(ScalarValue::Real(f)) => Some(f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Some(ScalarValue::Text(s)) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// Total order used by sorting and ranking: present values in their natural order, then
    /// missing values.
    ///
    /// Integer and Real scalars compare numerically. Scalars of unrelated dtypes compare by
    /// dtype so the order stays total.
    pub fn cmp_missing_last(&self, other: &Self) -> Ordering {
        match (&self.value, &other.value) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a
                .cmp_sort(b)
                .unwrap_or_else(|| self.dtype.cmp(&other.dtype)),
        }
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.dtype == other.dtype
            && match (&self.value, &other.value) {
                (None, None) => true,
                (Some(a), Some(b)) => a.group_eq(b),
                _ => false,
            }
    }
}

impl Eq for Scalar {}

impl Hash for Scalar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dtype.hash(state);
        match &self.value {
            None => state.write_u8(0),
            Some(v) => {
                state.write_u8(1);
                v.group_hash(state);
            }
        }
    }
}

impl From<ScalarValue> for Scalar {
    fn from(value: ScalarValue) -> Self {
        Self::from_value(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::integer(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::integer(i64::from(value))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::real(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::text(value)
    }
}

impl From<Arc<str>> for Scalar {
    fn from(value: Arc<str>) -> Self {
        Self::text(value)
    }
}

impl<T> From<Option<T>> for Scalar
where
    T: ScalarType + Into<Scalar>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Scalar::null(T::dtype()),
        }
    }
}
