//! Expression evaluation against a fact

use crate::engine::operators::{
    execute_binary_op, execute_compare, execute_logical_op, execute_unary_op,
};
use crate::error::Result;
use verdict_core::ast::{Expression, Operator};
use verdict_core::{Fact, Value};

/// Tree-walking evaluator for compiled conditions and action values
pub struct ExpressionEvaluator;

impl ExpressionEvaluator {
    /// Evaluate an expression to a value
    pub fn evaluate(expr: &Expression, fact: &Fact) -> Result<Value> {
        match expr {
            Expression::Literal(value) => Ok(value.clone()),

            Expression::Field(field) => Ok(fact.get(*field)),

            Expression::Binary { left, op, right } => match op {
                Operator::And | Operator::Or => Self::evaluate_logical(left, *op, right, fact),
                op if op.is_arithmetic() => {
                    let l = Self::evaluate(left, fact)?;
                    let r = Self::evaluate(right, fact)?;
                    execute_binary_op(&l, *op, &r)
                }
                op => {
                    let l = Self::evaluate(left, fact)?;
                    let r = Self::evaluate(right, fact)?;
                    execute_compare(&l, *op, &r).map(Value::Bool)
                }
            },

            Expression::Unary { op, operand } => {
                let value = Self::evaluate(operand, fact)?;
                execute_unary_op(&value, *op)
            }
        }
    }

    /// Evaluate a rule condition. Only `true` activates a rule; `false` and
    /// `null` do not.
    pub fn evaluate_condition(expr: &Expression, fact: &Fact) -> Result<bool> {
        Ok(matches!(Self::evaluate(expr, fact)?, Value::Bool(true)))
    }

    fn evaluate_logical(
        left: &Expression,
        op: Operator,
        right: &Expression,
        fact: &Fact,
    ) -> Result<Value> {
        let l = Self::evaluate(left, fact)?;

        // Short-circuit on a decided left operand
        match (op, &l) {
            (Operator::And, Value::Bool(false)) => return Ok(Value::Bool(false)),
            (Operator::Or, Value::Bool(true)) => return Ok(Value::Bool(true)),
            _ => {}
        }

        let r = Self::evaluate(right, fact)?;
        execute_logical_op(&l, op, &r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeError;
    use verdict_core::ast::UnaryOperator;
    use verdict_core::FactField;

    fn fact() -> Fact {
        Fact::new("tx-1").with_amount(250.0).with_country("US")
    }

    #[test]
    fn test_field_comparison() {
        let expr = Expression::binary(
            Expression::field(FactField::Amount),
            Operator::Gt,
            Expression::literal(100.0),
        );
        assert!(ExpressionEvaluator::evaluate_condition(&expr, &fact()).unwrap());
    }

    #[test]
    fn test_missing_field_does_not_activate() {
        let expr = Expression::unary(
            UnaryOperator::Not,
            Expression::binary(
                Expression::field(FactField::UserAge),
                Operator::Lt,
                Expression::literal(18.0),
            ),
        );
        // not(false) is true: a null comparison is false, not null
        assert!(ExpressionEvaluator::evaluate_condition(&expr, &fact()).unwrap());

        let null_bool = Expression::field(FactField::IsVip);
        assert!(!ExpressionEvaluator::evaluate_condition(&null_bool, &fact()).unwrap());
    }

    #[test]
    fn test_and_short_circuits_division_by_zero() {
        let guarded = Expression::binary(
            Expression::literal(false),
            Operator::And,
            Expression::binary(
                Expression::binary(
                    Expression::field(FactField::Amount),
                    Operator::Div,
                    Expression::literal(0.0),
                ),
                Operator::Gt,
                Expression::literal(1.0),
            ),
        );
        assert!(!ExpressionEvaluator::evaluate_condition(&guarded, &fact()).unwrap());

        let unguarded = Expression::binary(
            Expression::binary(
                Expression::field(FactField::Amount),
                Operator::Div,
                Expression::literal(0.0),
            ),
            Operator::Gt,
            Expression::literal(1.0),
        );
        assert_eq!(
            ExpressionEvaluator::evaluate_condition(&unguarded, &fact()),
            Err(RuntimeError::DivisionByZero)
        );
    }

    #[test]
    fn test_null_or_true() {
        let expr = Expression::binary(
            Expression::field(FactField::IsVip),
            Operator::Or,
            Expression::binary(
                Expression::field(FactField::Country),
                Operator::Eq,
                Expression::literal("US"),
            ),
        );
        assert!(ExpressionEvaluator::evaluate_condition(&expr, &fact()).unwrap());
    }
}
