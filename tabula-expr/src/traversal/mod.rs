//! Depth-first walks over expression trees, used to find the columns and the kinds of
//! function an expression uses before it is evaluated.

mod kinds;
mod references;

pub use kinds::KindFinder;
pub use references::ReferenceCollector;
use tabula_error::TabulaResult;

use crate::ExprRef;

/// What a [`NodeVisitor`] asks the traversal to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalOrder {
    /// Do not descend into the children of this node. Has no effect on the way up.
    Skip,
    /// End the whole traversal.
    Stop,
    Continue,
}

/// Callbacks for each node of a tree, once before its children and once after.
pub trait NodeVisitor<'a> {
    type NodeTy: Node;

    fn visit_down(&mut self, _node: &'a Self::NodeTy) -> TabulaResult<TraversalOrder> {
        Ok(TraversalOrder::Continue)
    }

    fn visit_up(&mut self, _node: &'a Self::NodeTy) -> TabulaResult<TraversalOrder> {
        Ok(TraversalOrder::Continue)
    }
}

pub trait Node: Sized {
    fn accept<'a, V: NodeVisitor<'a, NodeTy = Self>>(
        &'a self,
        visitor: &mut V,
    ) -> TabulaResult<TraversalOrder>;
}

impl Node for ExprRef {
    fn accept<'a, V: NodeVisitor<'a, NodeTy = ExprRef>>(
        &'a self,
        visitor: &mut V,
    ) -> TabulaResult<TraversalOrder> {
        match visitor.visit_down(self)? {
            TraversalOrder::Stop => return Ok(TraversalOrder::Stop),
            TraversalOrder::Skip => return Ok(TraversalOrder::Continue),
            TraversalOrder::Continue => {}
        }
        for child in self.children() {
            if child.accept(visitor)? == TraversalOrder::Stop {
                return Ok(TraversalOrder::Stop);
            }
        }
        visitor.visit_up(self)
    }
}
