use num_traits::ToPrimitive;
use tabula_dtype::DType;

use crate::{Scalar, ScalarValue};

impl Scalar {
    /// Convert this scalar to another dtype.
    ///
    /// Conversions that have no sensible result (unparseable text, non-finite or out of range
    /// reals converted to integers) produce a missing value rather than an error.
    pub fn cast(&self, dtype: DType) -> Scalar {
        if self.dtype() == dtype {
            return self.clone();
        }
        let Some(value) = self.value() else {
            return Scalar::null(dtype);
        };
        let converted = match (value, dtype) {
            (ScalarValue::Bool(b), DType::Integer) => Some(ScalarValue::Integer(i64::from(*b))),
            (ScalarValue::Bool(b), DType::Real) => Some(ScalarValue::Real(f64::from(u8::from(*b)))),
            (ScalarValue::Integer(i), DType::Real) => Some(ScalarValue::Real(*i as f64)),
            (ScalarValue::Integer(i), DType::Bool) => Some(ScalarValue::Bool(*i != 0)),
            (ScalarValue::Real(f), DType::Integer) => f.trunc().to_i64().map(ScalarValue::Integer),
            (ScalarValue::Real(f), DType::Bool) => {
                (!f.is_nan()).then(|| ScalarValue::Bool(*f != 0.0))
            }
            (ScalarValue::Text(s), DType::Integer) => {
                s.trim().parse::<i64>().ok().map(ScalarValue::Integer)
            }
            (ScalarValue::Text(s), DType::Real) => s.trim().parse::<f64>().ok().map(ScalarValue::Real),
            (ScalarValue::Text(s), DType::Bool) => parse_bool(s).map(ScalarValue::Bool),
            (ScalarValue::Bool(b), DType::Text) => Some(ScalarValue::Text(b.to_string().into())),
            (ScalarValue::Integer(i), DType::Text) => Some(ScalarValue::Text(i.to_string().into())),
            (ScalarValue::Real(f), DType::Text) => Some(ScalarValue::Text(f.to_string().into())),
            // same-dtype pairs returned above
            (v, _) => Some(v.clone()),
        };
        match converted {
            Some(v) => Scalar::from_value(v),
            None => Scalar::null(dtype),
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "true" | "TRUE" | "True" | "T" => Some(true),
        "false" | "FALSE" | "False" | "F" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Scalar::real(2.9), DType::Integer, Scalar::integer(2))]
    #[case(Scalar::real(-2.9), DType::Integer, Scalar::integer(-2))]
    #[case(Scalar::real(f64::NAN), DType::Integer, Scalar::null(DType::Integer))]
    #[case(Scalar::real(1e300), DType::Integer, Scalar::null(DType::Integer))]
    #[case(Scalar::integer(3), DType::Real, Scalar::real(3.0))]
    #[case(Scalar::bool(true), DType::Integer, Scalar::integer(1))]
    #[case(Scalar::text(" 42 "), DType::Integer, Scalar::integer(42))]
    #[case(Scalar::text("x"), DType::Real, Scalar::null(DType::Real))]
    #[case(Scalar::text("TRUE"), DType::Bool, Scalar::bool(true))]
    #[case(Scalar::integer(7), DType::Text, Scalar::text("7"))]
    #[case(Scalar::null(DType::Text), DType::Integer, Scalar::null(DType::Integer))]
    fn cast(#[case] input: Scalar, #[case] dtype: DType, #[case] expected: Scalar) {
        assert_eq!(input.cast(dtype), expected);
    }
}
