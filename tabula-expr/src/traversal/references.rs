use tabula_array::aliases::hash_set::HashSet;
use tabula_dtype::FieldName;
use tabula_error::TabulaResult;

use crate::traversal::{NodeVisitor, TraversalOrder};
use crate::{ColumnRef, ExprRef};

/// Collects the names of every column an expression references.
#[derive(Default)]
pub struct ReferenceCollector {
    fields: HashSet<FieldName>,
}

impl ReferenceCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_fields(self) -> HashSet<FieldName> {
        self.fields
    }
}

impl<'a> NodeVisitor<'a> for ReferenceCollector {
    type NodeTy = ExprRef;

    fn visit_up(&mut self, node: &'a ExprRef) -> TabulaResult<TraversalOrder> {
        if let Some(column) = node.as_any().downcast_ref::<ColumnRef>() {
            self.fields.insert(column.name().clone());
        }
        Ok(TraversalOrder::Continue)
    }
}
