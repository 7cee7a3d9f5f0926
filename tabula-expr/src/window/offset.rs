use std::any::Any;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use tabula_array::{Column, ColumnBuilder};
use tabula_error::{TabulaResult, tabula_bail};
use tabula_scalar::Scalar;

use crate::window::evaluate_argument;
use crate::{ExprKind, ExprRef, Scope, TabulaExpr};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum OffsetDirection {
    /// Values from earlier rows.
    Lag,
    /// Values from later rows.
    Lead,
}

/// The value `n` rows before ([`lag`]) or after ([`lead`]) each row of the scope.
#[derive(Debug, Clone, Eq)]
pub struct Offset {
    direction: OffsetDirection,
    child: ExprRef,
    n: i64,
    default: Option<Scalar>,
}

impl Offset {
    pub fn new(direction: OffsetDirection, child: ExprRef) -> Self {
        Self {
            direction,
            child,
            n: 1,
            default: None,
        }
    }

    /// Shift by `n` rows instead of one.
    pub fn by(mut self, n: i64) -> Self {
        self.n = n;
        self
    }

    /// The value used where the shift runs past the scope, cast to the argument's dtype.
    pub fn default(mut self, default: impl Into<Scalar>) -> Self {
        self.default = Some(default.into());
        self
    }

    fn name(&self) -> &'static str {
        match self.direction {
            OffsetDirection::Lag => "lag",
            OffsetDirection::Lead => "lead",
        }
    }
}

impl PartialEq for Offset {
    fn eq(&self, other: &Offset) -> bool {
        self.direction == other.direction
            && self.n == other.n
            && self.default == other.default
            && self.child.eq(&other.child)
    }
}

impl Display for Offset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({}", self.name(), self.child)?;
        if self.n != 1 || self.default.is_some() {
            write!(f, ", {}", self.n)?;
        }
        if let Some(default) = &self.default {
            write!(f, ", default = {}", default)?;
        }
        write!(f, ")")
    }
}

impl TabulaExpr for Offset {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn evaluate(&self, scope: &Scope<'_>) -> TabulaResult<Column> {
        let Ok(n) = usize::try_from(self.n) else {
            tabula_bail!("{} needs a non-negative offset, got {}", self.name(), self.n);
        };
        let values = evaluate_argument(self.name(), &self.child, scope)?;
        let default = match &self.default {
            Some(default) => default.cast(values.dtype()),
            None => Scalar::null(values.dtype()),
        };
        let len = values.len();
        let mut builder = ColumnBuilder::with_capacity(values.dtype(), len);
        for row in 0..len {
            let source = match self.direction {
                OffsetDirection::Lag => row.checked_sub(n),
                OffsetDirection::Lead => row.checked_add(n).filter(|&source| source < len),
            };
            match source {
                Some(source) => builder.append_scalar(&values.scalar_at(source))?,
                None => builder.append_scalar(&default)?,
            }
        }
        Ok(builder.finish())
    }

    fn children(&self) -> Vec<&ExprRef> {
        vec![&self.child]
    }

    fn kind(&self) -> ExprKind {
        ExprKind::Window
    }
}

impl From<Offset> for ExprRef {
    fn from(value: Offset) -> Self {
        Arc::new(value)
    }
}

pub fn lag(child: impl Into<ExprRef>) -> Offset {
    Offset::new(OffsetDirection::Lag, child.into())
}

pub fn lead(child: impl Into<ExprRef>) -> Offset {
    Offset::new(OffsetDirection::Lead, child.into())
}
