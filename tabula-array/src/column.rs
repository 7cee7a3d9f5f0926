use std::sync::Arc;

use arrow_buffer::{BooleanBuffer, ScalarBuffer};
use tabula_dtype::DType;
use tabula_error::{TabulaResult, tabula_bail};
use tabula_scalar::{Scalar, ScalarValue};

use crate::ColumnBuilder;
use crate::validity::Validity;

/// The physical values of a [`Column`], one buffer per [`DType`].
///
/// Slots behind a missing validity bit hold an unspecified placeholder.
#[derive(Clone, Debug)]
pub enum ColumnValues {
    Bool(BooleanBuffer),
    Integer(ScalarBuffer<i64>),
    Real(ScalarBuffer<f64>),
    Text(Arc<[Arc<str>]>),
}

impl ColumnValues {
    pub fn dtype(&self) -> DType {
        match self {
            Self::Bool(_) => DType::Bool,
            Self::Integer(_) => DType::Integer,
            Self::Real(_) => DType::Real,
            Self::Text(_) => DType::Text,
        }
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(b) => b.len(),
            Self::Integer(b) => b.len(),
            Self::Real(b) => b.len(),
            Self::Text(b) => b.len(),
        }
    }
}

/// A homogeneously typed, nullable, fixed-length sequence of values.
///
/// Columns are immutable; cloning shares the underlying buffers.
#[derive(Clone, Debug)]
pub struct Column {
    values: ColumnValues,
    validity: Validity,
}

impl Column {
    /// Create a column from its values and validity, checking that their lengths agree.
    pub fn try_new(values: ColumnValues, validity: Validity) -> TabulaResult<Self> {
        if let Validity::Array(buffer) = &validity {
            if buffer.len() != values.len() {
                tabula_bail!(
                    Shape: "validity of length {} does not match {} values",
                    buffer.len(),
                    values.len()
                );
            }
        }
        Ok(Self { values, validity })
    }

    pub(crate) fn new(values: ColumnValues, validity: Validity) -> Self {
        debug_assert!(
            !matches!(&validity, Validity::Array(b) if b.len() != values.len()),
            "validity length mismatch"
        );
        Self { values, validity }
    }

    /// A column of `len` copies of `scalar`.
    pub fn constant(scalar: &Scalar, len: usize) -> Self {
        let validity = if scalar.is_null() {
            Validity::AllInvalid
        } else {
            Validity::AllValid
        };
        let values = match (scalar.dtype(), scalar.value()) {
            (_, Some(ScalarValue::Bool(b))) => ColumnValues::Bool(if *b {
                BooleanBuffer::new_set(len)
            } else {
                BooleanBuffer::new_unset(len)
            }),
            (_, Some(ScalarValue::Integer(i))) => ColumnValues::Integer(vec![*i; len].into()),
            (_, Some(ScalarValue::Real(r))) => ColumnValues::Real(vec![*r; len].into()),
            (_, Some(ScalarValue::Text(s))) => {
                ColumnValues::Text(std::iter::repeat_n(s.clone(), len).collect())
            }
            (DType::Bool, None) => ColumnValues::Bool(BooleanBuffer::new_unset(len)),
            (DType::Integer, None) => ColumnValues::Integer(vec![0; len].into()),
            (DType::Real, None) => ColumnValues::Real(vec![0.0; len].into()),
            (DType::Text, None) => {
                ColumnValues::Text(std::iter::repeat_n(Arc::<str>::from(""), len).collect())
            }
        };
        Self::new(values, validity)
    }

    /// A column of `len` missing values.
    pub fn nulls(dtype: DType, len: usize) -> Self {
        Self::constant(&Scalar::null(dtype), len)
    }

    pub fn empty(dtype: DType) -> Self {
        Self::nulls(dtype, 0)
    }

    /// Build a column of the given dtype from scalars.
    ///
    /// Integer scalars are widened into Real columns; any other dtype mismatch is an error.
    pub fn from_scalars<'a>(
        dtype: DType,
        scalars: impl IntoIterator<Item = &'a Scalar>,
    ) -> TabulaResult<Self> {
        let iter = scalars.into_iter();
        let mut builder = ColumnBuilder::with_capacity(dtype, iter.size_hint().0);
        for scalar in iter {
            builder.append_scalar(scalar)?;
        }
        Ok(builder.finish())
    }

    #[inline]
    pub fn dtype(&self) -> DType {
        self.values.dtype()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn values(&self) -> &ColumnValues {
        &self.values
    }

    pub fn validity(&self) -> &Validity {
        &self.validity
    }

    #[inline]
    pub fn is_valid(&self, index: usize) -> bool {
        self.validity.is_valid(index)
    }

    pub fn null_count(&self) -> usize {
        self.validity.null_count(self.len())
    }

    /// Returns the value at `index` as a [`Scalar`].
    ///
    /// ## Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn scalar_at(&self, index: usize) -> Scalar {
        if !self.validity.is_valid(index) {
            return Scalar::null(self.dtype());
        }
        match &self.values {
            ColumnValues::Bool(b) => Scalar::bool(b.value(index)),
            ColumnValues::Integer(b) => Scalar::integer(b[index]),
            ColumnValues::Real(b) => Scalar::real(b[index]),
            ColumnValues::Text(b) => Scalar::text(b[index].clone()),
        }
    }

    pub fn scalars(&self) -> impl Iterator<Item = Scalar> + '_ {
        (0..self.len()).map(|idx| self.scalar_at(idx))
    }

    /// Iterate a Bool column.
    pub fn bool_iter(&self) -> TabulaResult<impl Iterator<Item = Option<bool>> + '_> {
        let ColumnValues::Bool(buffer) = &self.values else {
            tabula_bail!(Schema: "expected a bool column, found {}", self.dtype());
        };
        Ok(buffer
            .iter()
            .enumerate()
            .map(|(idx, v)| self.validity.is_valid(idx).then_some(v)))
    }

    /// Iterate an Integer column.
    pub fn i64_iter(&self) -> TabulaResult<impl Iterator<Item = Option<i64>> + '_> {
        let ColumnValues::Integer(buffer) = &self.values else {
            tabula_bail!(Schema: "expected an int column, found {}", self.dtype());
        };
        Ok(buffer
            .iter()
            .enumerate()
            .map(|(idx, v)| self.validity.is_valid(idx).then_some(*v)))
    }

    /// Iterate a numeric column as floats; Integer values are converted.
    pub fn f64_iter(&self) -> TabulaResult<Box<dyn Iterator<Item = Option<f64>> + '_>> {
        match &self.values {
            ColumnValues::Integer(buffer) => Ok(Box::new(
                buffer
                    .iter()
                    .enumerate()
                    .map(|(idx, v)| self.validity.is_valid(idx).then_some(*v as f64)),
            )),
            ColumnValues::Real(buffer) => Ok(Box::new(
                buffer
                    .iter()
                    .enumerate()
                    .map(|(idx, v)| self.validity.is_valid(idx).then_some(*v)),
            )),
            _ => tabula_bail!(Schema: "expected a numeric column, found {}", self.dtype()),
        }
    }

    /// Iterate a Text column.
    pub fn str_iter(&self) -> TabulaResult<impl Iterator<Item = Option<&str>> + '_> {
        let ColumnValues::Text(buffer) = &self.values else {
            tabula_bail!(Schema: "expected a text column, found {}", self.dtype());
        };
        Ok(buffer
            .iter()
            .enumerate()
            .map(|(idx, v)| self.validity.is_valid(idx).then_some(v.as_ref())))
    }
}

/// Columns are equal when they hold the same dtype and the same values, with missing equal to
/// missing and `NaN` equal to `NaN`.
impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.dtype() == other.dtype()
            && self.len() == other.len()
            && self.scalars().zip(other.scalars()).all(|(a, b)| a == b)
    }
}

fn split_options<T: Default>(iter: impl IntoIterator<Item = Option<T>>) -> (Vec<T>, Validity) {
    let iter = iter.into_iter();
    let mut values = Vec::with_capacity(iter.size_hint().0);
    let mut validity = Vec::with_capacity(iter.size_hint().0);
    for item in iter {
        validity.push(item.is_some());
        values.push(item.unwrap_or_default());
    }
    (values, Validity::from_iter(validity))
}

impl FromIterator<Option<bool>> for Column {
    fn from_iter<T: IntoIterator<Item = Option<bool>>>(iter: T) -> Self {
        let (values, validity) = split_options(iter);
        Self::new(ColumnValues::Bool(BooleanBuffer::from(values)), validity)
    }
}

impl FromIterator<Option<i64>> for Column {
    fn from_iter<T: IntoIterator<Item = Option<i64>>>(iter: T) -> Self {
        let (values, validity) = split_options(iter);
        Self::new(ColumnValues::Integer(values.into()), validity)
    }
}

impl FromIterator<Option<f64>> for Column {
    fn from_iter<T: IntoIterator<Item = Option<f64>>>(iter: T) -> Self {
        let (values, validity) = split_options(iter);
        Self::new(ColumnValues::Real(values.into()), validity)
    }
}

impl FromIterator<Option<Arc<str>>> for Column {
    fn from_iter<T: IntoIterator<Item = Option<Arc<str>>>>(iter: T) -> Self {
        let (values, validity) = split_options(iter);
        Self::new(ColumnValues::Text(values.into()), validity)
    }
}

impl<'a> FromIterator<Option<&'a str>> for Column {
    fn from_iter<T: IntoIterator<Item = Option<&'a str>>>(iter: T) -> Self {
        iter.into_iter().map(|s| s.map(Arc::<str>::from)).collect()
    }
}

impl FromIterator<Option<String>> for Column {
    fn from_iter<T: IntoIterator<Item = Option<String>>>(iter: T) -> Self {
        iter.into_iter().map(|s| s.map(Arc::<str>::from)).collect()
    }
}

macro_rules! column_from_vec {
    ($T:ty) => {
        impl From<Vec<$T>> for Column {
            fn from(value: Vec<$T>) -> Self {
                value.into_iter().map(Some).collect()
            }
        }

        impl From<Vec<Option<$T>>> for Column {
            fn from(value: Vec<Option<$T>>) -> Self {
                value.into_iter().collect()
            }
        }
    };
}

column_from_vec!(bool);
column_from_vec!(i64);
column_from_vec!(f64);
column_from_vec!(Arc<str>);
column_from_vec!(&str);
column_from_vec!(String);
