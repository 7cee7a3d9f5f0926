use std::fmt::{Display, Formatter};
use std::sync::Arc;

use itertools::Itertools;

/// A name for a column in a table
pub type FieldName = Arc<str>;
/// An ordered list of column names
pub type FieldNames = Arc<[FieldName]>;

/// Displays a list of field names as a comma separated list.
pub struct DisplayFieldNames<'a>(pub &'a [FieldName]);

impl Display for DisplayFieldNames<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join(", "))
    }
}

/// Returns the first name that appears more than once, if any.
pub fn first_duplicate<'a>(names: impl IntoIterator<Item = &'a FieldName>) -> Option<&'a FieldName> {
    names.into_iter().duplicates().next()
}
