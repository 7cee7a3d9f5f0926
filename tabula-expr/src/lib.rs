//! Expressions evaluated by the verbs.
//!
//! An expression is a tree of [`TabulaExpr`] nodes evaluated against a [`Scope`]: the rows of
//! one group (or of the whole table) plus any columns bound earlier in the same verb call.
//! Evaluation yields a [`Column`] of the scope length, or of length 1, which the verbs
//! broadcast.

use std::any::Any;
use std::fmt::{Debug, Display};
use std::sync::Arc;

use tabula_array::Column;
use tabula_array::aliases::hash_set::HashSet;
use tabula_dtype::FieldName;
use tabula_error::{TabulaResult, TabulaUnwrap};

mod aggregate;
mod between;
mod binary;
mod cast;
mod column;
mod conditional;
mod is_in;
mod is_null;
mod literal;
mod math;
mod not;
mod operators;
mod scope;
pub mod traversal;
mod window;

pub use aggregate::*;
pub use between::*;
pub use binary::*;
pub use cast::*;
pub use column::*;
pub use conditional::*;
pub use is_in::*;
pub use is_null::*;
pub use literal::*;
pub use math::*;
pub use not::*;
pub use operators::*;
pub use scope::*;
pub use window::*;

use crate::traversal::{KindFinder, Node, ReferenceCollector};

pub type ExprRef = Arc<dyn TabulaExpr>;

/// How an expression relates the rows of its scope to the rows of its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
    /// One output row per input row, each computed from its own row.
    Elementwise,
    /// One output value for the whole scope.
    Aggregate,
    /// One output row per input row, each computed from the ordered rows of the scope.
    Window,
}

/// Represents a logical operation producing a [`Column`] from a [`Scope`].
pub trait TabulaExpr: Debug + Send + Sync + DynEq + Display {
    /// Convert expression reference to reference of [`Any`] type
    fn as_any(&self) -> &dyn Any;

    /// Compute the result of the expression over the scope.
    fn evaluate(&self, scope: &Scope<'_>) -> TabulaResult<Column>;

    fn children(&self) -> Vec<&ExprRef>;

    /// The kind of this node, ignoring its children.
    fn kind(&self) -> ExprKind {
        ExprKind::Elementwise
    }
}

pub trait TabulaExprExt {
    /// Accumulate all column references from this expression and its children in a set
    fn references(&self) -> HashSet<FieldName>;

    /// Whether this expression or any of its children is of the given kind.
    fn contains_kind(&self, kind: ExprKind) -> bool;
}

impl TabulaExprExt for ExprRef {
    fn references(&self) -> HashSet<FieldName> {
        let mut collector = ReferenceCollector::new();
        // The collector is infallible, so we can unwrap the result
        self.accept(&mut collector).tabula_unwrap();
        collector.into_fields()
    }

    fn contains_kind(&self, kind: ExprKind) -> bool {
        let mut finder = KindFinder::new(kind);
        self.accept(&mut finder).tabula_unwrap();
        finder.found()
    }
}

/// [`TabulaExpr`] can't be constrained by [`Eq`] directly because it must remain object
/// safe. To ease implementation blanket implementation is provided for [`Eq`] types.
pub trait DynEq {
    fn dyn_eq(&self, other: &dyn Any) -> bool;
}

impl<T: Eq + Any> DynEq for T {
    fn dyn_eq(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<Self>() == Some(self)
    }
}

impl PartialEq for dyn TabulaExpr {
    fn eq(&self, other: &Self) -> bool {
        self.dyn_eq(other.as_any())
    }
}

impl Eq for dyn TabulaExpr {}
