use tabula_error::TabulaResult;

use crate::traversal::{NodeVisitor, TraversalOrder};
use crate::{ExprKind, ExprRef};

/// Stops at the first node of the given [`ExprKind`].
pub struct KindFinder {
    kind: ExprKind,
    found: bool,
}

impl KindFinder {
    pub fn new(kind: ExprKind) -> Self {
        Self { kind, found: false }
    }

    pub fn found(&self) -> bool {
        self.found
    }
}

impl<'a> NodeVisitor<'a> for KindFinder {
    type NodeTy = ExprRef;

    fn visit_down(&mut self, node: &'a ExprRef) -> TabulaResult<TraversalOrder> {
        if node.kind() == self.kind {
            self.found = true;
            return Ok(TraversalOrder::Stop);
        }
        Ok(TraversalOrder::Continue)
    }
}
