use std::cmp::Ordering;
use std::hash::Hasher;
use std::sync::Arc;

use tabula_dtype::DType;

/// A present value of one of the [`DType`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(Arc<str>),
}

impl ScalarValue {
    pub fn dtype(&self) -> DType {
        match self {
            ScalarValue::Bool(_) => DType::Bool,
            ScalarValue::Integer(_) => DType::Integer,
            ScalarValue::Real(_) => DType::Real,
            ScalarValue::Text(_) => DType::Text,
        }
    }

    /// Equality used for grouping and distinct counting: NaN equals NaN, -0.0 equals 0.0.
    pub fn group_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ScalarValue::Real(a), ScalarValue::Real(b)) => canonical_bits(*a) == canonical_bits(*b),
            _ => self == other,
        }
    }

    pub(crate) fn group_hash<H: Hasher>(&self, state: &mut H) {
        match self {
            ScalarValue::Bool(b) => state.write_u8(u8::from(*b)),
            ScalarValue::Integer(i) => state.write_i64(*i),
            ScalarValue::Real(f) => state.write_u64(canonical_bits(*f)),
            ScalarValue::Text(s) => state.write(s.as_bytes()),
        }
    }

    /// Sort order between two present values.
    ///
    /// NaN sorts after every other number and equal to itself. Returns `None` when the values
    /// are of unrelated dtypes.
    pub fn cmp_sort(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (ScalarValue::Bool(a), ScalarValue::Bool(b)) => Some(a.cmp(b)),
            (ScalarValue::Integer(a), ScalarValue::Integer(b)) => Some(a.cmp(b)),
            (ScalarValue::Real(a), ScalarValue::Real(b)) => Some(cmp_f64(*a, *b)),
            (ScalarValue::Integer(a), ScalarValue::Real(b)) => Some(cmp_f64(*a as f64, *b)),
            (ScalarValue::Real(a), ScalarValue::Integer(b)) => Some(cmp_f64(*a, *b as f64)),
            (ScalarValue::Text(a), ScalarValue::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Orders floats with NaN after every number.
pub fn cmp_f64(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn canonical_bits(f: f64) -> u64 {
    if f.is_nan() {
        f64::NAN.to_bits()
    } else if f == 0.0 {
        0.0f64.to_bits()
    } else {
        f.to_bits()
    }
}
