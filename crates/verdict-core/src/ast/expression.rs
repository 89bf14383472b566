//! Expression AST nodes

use super::operator::Operator;
use crate::types::{FactField, Value};
use serde::{Deserialize, Serialize};

/// Expression AST node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Literal value (including `[..]` membership lists)
    Literal(Value),

    /// Field of the fact (e.g., amount, risk_score)
    Field(FactField),

    /// Binary operation
    Binary {
        left: Box<Expression>,
        op: Operator,
        right: Box<Expression>,
    },

    /// Unary operation
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    /// Logical NOT (!, not)
    Not,
    /// Arithmetic negation (-)
    Negate,
}

impl Expression {
    /// Create a literal expression
    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(value.into())
    }

    /// Create a field reference expression
    pub fn field(field: FactField) -> Self {
        Expression::Field(field)
    }

    /// Create a binary expression
    pub fn binary(left: Expression, op: Operator, right: Expression) -> Self {
        Expression::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Create a unary expression
    pub fn unary(op: UnaryOperator, operand: Expression) -> Self {
        Expression::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Conjunction of several conditions; an empty list is always true
    pub fn all(conditions: Vec<Expression>) -> Self {
        conditions
            .into_iter()
            .reduce(|acc, next| Expression::binary(acc, Operator::And, next))
            .unwrap_or(Expression::Literal(Value::Bool(true)))
    }

}
