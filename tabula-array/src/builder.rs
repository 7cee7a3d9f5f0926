use std::sync::Arc;

use arrow_buffer::BooleanBufferBuilder;
use tabula_dtype::DType;
use tabula_error::{TabulaResult, tabula_bail};
use tabula_scalar::{Scalar, ScalarValue};

use crate::validity::Validity;
use crate::{Column, ColumnValues};

enum ValuesBuilder {
    Bool(BooleanBufferBuilder),
    Integer(Vec<i64>),
    Real(Vec<f64>),
    Text(Vec<Arc<str>>),
}

/// Incrementally builds a [`Column`] of a fixed [`DType`].
pub struct ColumnBuilder {
    values: ValuesBuilder,
    validity: BooleanBufferBuilder,
    null_count: usize,
}

impl ColumnBuilder {
    pub fn with_capacity(dtype: DType, capacity: usize) -> Self {
        let values = match dtype {
            DType::Bool => ValuesBuilder::Bool(BooleanBufferBuilder::new(capacity)),
            DType::Integer => ValuesBuilder::Integer(Vec::with_capacity(capacity)),
            DType::Real => ValuesBuilder::Real(Vec::with_capacity(capacity)),
            DType::Text => ValuesBuilder::Text(Vec::with_capacity(capacity)),
        };
        Self {
            values,
            validity: BooleanBufferBuilder::new(capacity),
            null_count: 0,
        }
    }

    pub fn dtype(&self) -> DType {
        match self.values {
            ValuesBuilder::Bool(_) => DType::Bool,
            ValuesBuilder::Integer(_) => DType::Integer,
            ValuesBuilder::Real(_) => DType::Real,
            ValuesBuilder::Text(_) => DType::Text,
        }
    }

    pub fn len(&self) -> usize {
        self.validity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn append_null(&mut self) {
        match &mut self.values {
            ValuesBuilder::Bool(b) => b.append(false),
            ValuesBuilder::Integer(b) => b.push(0),
            ValuesBuilder::Real(b) => b.push(0.0),
            ValuesBuilder::Text(b) => b.push(Arc::from("")),
        }
        self.validity.append(false);
        self.null_count += 1;
    }

    /// Append a present value. Integers may be appended to a Real builder.
    pub fn append_value(&mut self, value: &ScalarValue) -> TabulaResult<()> {
        let dtype = self.dtype();
        match (&mut self.values, value) {
            (ValuesBuilder::Bool(b), ScalarValue::Bool(v)) => b.append(*v),
            (ValuesBuilder::Integer(b), ScalarValue::Integer(v)) => b.push(*v),
            (ValuesBuilder::Real(b), ScalarValue::Real(v)) => b.push(*v),
            (ValuesBuilder::Real(b), ScalarValue::Integer(v)) => b.push(*v as f64),
            (ValuesBuilder::Text(b), ScalarValue::Text(v)) => b.push(v.clone()),
            (_, value) => {
                tabula_bail!(
                    Schema: "cannot append {} value {} to a {} column",
                    value.dtype(),
                    value,
                    dtype
                )
            }
        }
        self.validity.append(true);
        Ok(())
    }

    pub fn append_scalar(&mut self, scalar: &Scalar) -> TabulaResult<()> {
        match scalar.value() {
            None => {
                self.append_null();
                Ok(())
            }
            Some(value) => self.append_value(value),
        }
    }

    /// Append every value of `column`, in order.
    pub fn extend_from_column(&mut self, column: &Column) -> TabulaResult<()> {
        for scalar in column.scalars() {
            self.append_scalar(&scalar)?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Column {
        let len = self.validity.len();
        let validity = if self.null_count == 0 {
            Validity::AllValid
        } else if self.null_count == len {
            Validity::AllInvalid
        } else {
            Validity::Array(self.validity.finish())
        };
        let values = match self.values {
            ValuesBuilder::Bool(mut b) => ColumnValues::Bool(b.finish()),
            ValuesBuilder::Integer(b) => ColumnValues::Integer(b.into()),
            ValuesBuilder::Real(b) => ColumnValues::Real(b.into()),
            ValuesBuilder::Text(b) => ColumnValues::Text(b.into()),
        };
        Column::new(values, validity)
    }
}
