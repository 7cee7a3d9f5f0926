use std::sync::Arc;

use tabula_dtype::DType;

/// A Rust type that maps onto a single Tabula [`DType`].
pub trait ScalarType {
    fn dtype() -> DType;
}

impl ScalarType for bool {
    fn dtype() -> DType {
        DType::Bool
    }
}

impl ScalarType for i32 {
    fn dtype() -> DType {
        DType::Integer
    }
}

impl ScalarType for i64 {
    fn dtype() -> DType {
        DType::Integer
    }
}

impl ScalarType for f64 {
    fn dtype() -> DType {
        DType::Real
    }
}

impl ScalarType for String {
    fn dtype() -> DType {
        DType::Text
    }
}

impl ScalarType for &str {
    fn dtype() -> DType {
        DType::Text
    }
}

impl ScalarType for Arc<str> {
    fn dtype() -> DType {
        DType::Text
    }
}
