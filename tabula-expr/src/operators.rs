use std::fmt::{Display, Formatter};

use tabula_array::compute::{BooleanOperator, CompareOperator, NumericOperator};

/// Binary operators of the expression language.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Operator {
    // arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    IntDiv,
    Mod,
    // comparison
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
    // element-wise boolean
    And,
    Or,
    /// Scalar conjunction: both sides must be length 1, the right side is skipped when the left
    /// is `false`.
    AndThen,
    /// Scalar disjunction: both sides must be length 1, the right side is skipped when the left
    /// is `true`.
    OrElse,
}

/// How an [`Operator`] is computed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum OperatorKind {
    Numeric(NumericOperator),
    Compare(CompareOperator),
    Boolean(BooleanOperator),
    ShortCircuit(BooleanOperator),
}

impl Operator {
    pub(crate) fn kind(self) -> OperatorKind {
        match self {
            Self::Add => OperatorKind::Numeric(NumericOperator::Add),
            Self::Sub => OperatorKind::Numeric(NumericOperator::Sub),
            Self::Mul => OperatorKind::Numeric(NumericOperator::Mul),
            Self::Div => OperatorKind::Numeric(NumericOperator::Div),
            Self::Pow => OperatorKind::Numeric(NumericOperator::Pow),
            Self::IntDiv => OperatorKind::Numeric(NumericOperator::IntDiv),
            Self::Mod => OperatorKind::Numeric(NumericOperator::Mod),
            Self::Eq => OperatorKind::Compare(CompareOperator::Eq),
            Self::NotEq => OperatorKind::Compare(CompareOperator::NotEq),
            Self::Gt => OperatorKind::Compare(CompareOperator::Gt),
            Self::Gte => OperatorKind::Compare(CompareOperator::Gte),
            Self::Lt => OperatorKind::Compare(CompareOperator::Lt),
            Self::Lte => OperatorKind::Compare(CompareOperator::Lte),
            Self::And => OperatorKind::Boolean(BooleanOperator::And),
            Self::Or => OperatorKind::Boolean(BooleanOperator::Or),
            Self::AndThen => OperatorKind::ShortCircuit(BooleanOperator::And),
            Self::OrElse => OperatorKind::ShortCircuit(BooleanOperator::Or),
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind() {
            OperatorKind::Numeric(op) => Display::fmt(&op, f),
            OperatorKind::Compare(op) => Display::fmt(&op, f),
            OperatorKind::Boolean(op) => Display::fmt(&op, f),
            OperatorKind::ShortCircuit(BooleanOperator::And) => f.write_str("&&"),
            OperatorKind::ShortCircuit(BooleanOperator::Or) => f.write_str("||"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Operator::Add, "+")]
    #[case(Operator::IntDiv, "%/%")]
    #[case(Operator::Mod, "%%")]
    #[case(Operator::Gte, ">=")]
    #[case(Operator::NotEq, "!=")]
    #[case(Operator::And, "&")]
    #[case(Operator::AndThen, "&&")]
    #[case(Operator::OrElse, "||")]
    fn display(#[case] op: Operator, #[case] expected: &str) {
        assert_eq!(op.to_string(), expected);
    }
}
