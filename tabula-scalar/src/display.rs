use std::fmt::{Display, Formatter};

use crate::{Scalar, ScalarValue};

impl Display for ScalarValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarValue::Bool(b) => write!(f, "{b}"),
            ScalarValue::Integer(i) => write!(f, "{i}"),
            ScalarValue::Real(r) => write!(f, "{r}"),
            ScalarValue::Text(s) => write!(f, "\"{s}\""),
        }
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.value() {
            None => write!(f, "null"),
            Some(v) => write!(f, "{v}"),
        }
    }
}
