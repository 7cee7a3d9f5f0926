use arrow_buffer::BooleanBuffer;

use crate::{Column, ColumnValues};

/// Create a new column by taking the values at the given `indices`, in order.
///
/// # Panics
///
/// Using `indices` that are out of bounds for the given `column` will cause a panic.
pub fn take(column: &Column, indices: &[usize]) -> Column {
    let values = match column.values() {
        ColumnValues::Bool(b) => ColumnValues::Bool(
            indices
                .iter()
                .map(|&idx| b.value(idx))
                .collect::<BooleanBuffer>(),
        ),
        ColumnValues::Integer(b) => {
            ColumnValues::Integer(indices.iter().map(|&idx| b[idx]).collect())
        }
        ColumnValues::Real(b) => ColumnValues::Real(indices.iter().map(|&idx| b[idx]).collect()),
        ColumnValues::Text(b) => {
            ColumnValues::Text(indices.iter().map(|&idx| b[idx].clone()).collect())
        }
    };
    Column::new(values, column.validity().take(indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_reorders_and_repeats() {
        let column = Column::from(vec![Some("a"), None, Some("c")]);
        let taken = take(&column, &[2, 1, 2, 0]);
        assert_eq!(
            taken,
            Column::from(vec![Some("c"), None, Some("c"), Some("a")])
        );
    }

    #[test]
    fn take_nothing() {
        let column = Column::from(vec![1.5, 2.5]);
        assert!(take(&column, &[]).is_empty());
    }
}
