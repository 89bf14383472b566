//! Constant folding optimizer
//!
//! Evaluates constant sub-expressions once at compile time so sessions do
//! not recompute them on every activation pass.

use verdict_core::ast::{Action, Expression, Operator, RuleDefinition, UnaryOperator};
use verdict_core::Value;

/// Constant folding optimizer
#[derive(Debug, Default)]
pub struct ConstantFolder;

impl ConstantFolder {
    /// Create a new constant folder
    pub fn new() -> Self {
        Self
    }

    /// Fold the condition and every action value of a rule
    pub fn fold_rule(&self, mut rule: RuleDefinition) -> RuleDefinition {
        for clause in &mut rule.clauses {
            clause.expression = self.fold(&clause.expression);
        }
        rule.actions = rule
            .actions
            .iter()
            .map(|action| match action {
                Action::Assign { field, value } => Action::assign(*field, self.fold(value)),
            })
            .collect();
        rule
    }

    /// Optimize an expression by folding constants
    pub fn fold(&self, expr: &Expression) -> Expression {
        match expr {
            Expression::Literal(_) | Expression::Field(_) => expr.clone(),

            Expression::Binary { left, op, right } => {
                let left_folded = self.fold(left);
                let right_folded = self.fold(right);

                // Try to fold if both operands are literals
                if let (Expression::Literal(left_val), Expression::Literal(right_val)) =
                    (&left_folded, &right_folded)
                {
                    if let Some(result) = self.fold_binary_op(left_val, *op, right_val) {
                        return Expression::Literal(result);
                    }
                }

                Expression::binary(left_folded, *op, right_folded)
            }

            Expression::Unary { op, operand } => {
                let operand_folded = self.fold(operand);

                if let Expression::Literal(val) = &operand_folded {
                    if let Some(result) = self.fold_unary_op(*op, val) {
                        return Expression::Literal(result);
                    }
                }

                Expression::unary(*op, operand_folded)
            }
        }
    }

    /// Fold a binary operation on two constant values.
    ///
    /// Division and modulo by zero are left for the runtime to report.
    fn fold_binary_op(&self, left: &Value, op: Operator, right: &Value) -> Option<Value> {
        match (left, op, right) {
            // Arithmetic operations on numbers
            (Value::Number(l), Operator::Add, Value::Number(r)) => Some(Value::Number(l + r)),
            (Value::Number(l), Operator::Sub, Value::Number(r)) => Some(Value::Number(l - r)),
            (Value::Number(l), Operator::Mul, Value::Number(r)) => Some(Value::Number(l * r)),
            (Value::Number(l), Operator::Div, Value::Number(r)) if *r != 0.0 => {
                Some(Value::Number(l / r))
            }
            (Value::Number(l), Operator::Mod, Value::Number(r)) if *r != 0.0 => {
                Some(Value::Number(l % r))
            }

            // Comparison operations on numbers
            (Value::Number(l), Operator::Gt, Value::Number(r)) => Some(Value::Bool(l > r)),
            (Value::Number(l), Operator::Ge, Value::Number(r)) => Some(Value::Bool(l >= r)),
            (Value::Number(l), Operator::Lt, Value::Number(r)) => Some(Value::Bool(l < r)),
            (Value::Number(l), Operator::Le, Value::Number(r)) => Some(Value::Bool(l <= r)),

            // Equality on scalars of the same type
            (Value::Number(l), Operator::Eq, Value::Number(r)) => Some(Value::Bool(l == r)),
            (Value::Number(l), Operator::Ne, Value::Number(r)) => Some(Value::Bool(l != r)),
            (Value::String(l), Operator::Eq, Value::String(r)) => Some(Value::Bool(l == r)),
            (Value::String(l), Operator::Ne, Value::String(r)) => Some(Value::Bool(l != r)),
            (Value::Bool(l), Operator::Eq, Value::Bool(r)) => Some(Value::Bool(l == r)),
            (Value::Bool(l), Operator::Ne, Value::Bool(r)) => Some(Value::Bool(l != r)),

            // Logical operations on booleans
            (Value::Bool(l), Operator::And, Value::Bool(r)) => Some(Value::Bool(*l && *r)),
            (Value::Bool(l), Operator::Or, Value::Bool(r)) => Some(Value::Bool(*l || *r)),

            // String operations
            (Value::String(l), Operator::Contains, Value::String(r)) => {
                Some(Value::Bool(l.contains(r.as_str())))
            }
            (Value::String(l), Operator::StartsWith, Value::String(r)) => {
                Some(Value::Bool(l.starts_with(r.as_str())))
            }
            (Value::String(l), Operator::EndsWith, Value::String(r)) => {
                Some(Value::Bool(l.ends_with(r.as_str())))
            }

            // Membership of a non-null scalar in a literal list
            (needle, Operator::In, Value::Array(items)) if !needle.is_null() => {
                Some(Value::Bool(items.contains(needle)))
            }
            (needle, Operator::NotIn, Value::Array(items)) if !needle.is_null() => {
                Some(Value::Bool(!items.contains(needle)))
            }

            // Can't fold
            _ => None,
        }
    }

    /// Fold a unary operation on a constant value
    fn fold_unary_op(&self, op: UnaryOperator, operand: &Value) -> Option<Value> {
        match (op, operand) {
            (UnaryOperator::Not, Value::Bool(b)) => Some(Value::Bool(!b)),
            (UnaryOperator::Negate, Value::Number(n)) => Some(Value::Number(-n)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_core::source::Location;
    use verdict_core::FactField;

    #[test]
    fn test_fold_literal() {
        let folder = ConstantFolder::new();
        let expr = Expression::literal(Value::Number(42.0));
        assert_eq!(folder.fold(&expr), Expression::literal(Value::Number(42.0)));
    }

    #[test]
    fn test_fold_arithmetic_inside_comparison() {
        let folder = ConstantFolder::new();
        // amount > 10 * 1000
        let expr = Expression::binary(
            Expression::field(FactField::Amount),
            Operator::Gt,
            Expression::binary(
                Expression::literal(10.0),
                Operator::Mul,
                Expression::literal(1000.0),
            ),
        );

        assert_eq!(
            folder.fold(&expr),
            Expression::binary(
                Expression::field(FactField::Amount),
                Operator::Gt,
                Expression::literal(10000.0),
            )
        );
    }

    #[test]
    fn test_division_by_zero_not_folded() {
        let folder = ConstantFolder::new();
        let expr = Expression::binary(
            Expression::literal(1.0),
            Operator::Div,
            Expression::literal(0.0),
        );
        assert_eq!(folder.fold(&expr), expr);
    }

    #[test]
    fn test_fold_membership_and_negation() {
        let folder = ConstantFolder::new();
        let expr = Expression::unary(
            UnaryOperator::Not,
            Expression::binary(
                Expression::literal("US"),
                Operator::In,
                Expression::literal(Value::Array(vec![Value::from("US"), Value::from("CA")])),
            ),
        );
        assert_eq!(folder.fold(&expr), Expression::literal(false));

        let null_member = Expression::binary(
            Expression::literal(Value::Null),
            Operator::In,
            Expression::literal(Value::Array(vec![Value::Null])),
        );
        assert_eq!(folder.fold(&null_member), null_member);
    }

    #[test]
    fn test_fold_rule_actions() {
        let folder = ConstantFolder::new();
        let rule = RuleDefinition::new("r", Expression::literal(true), Location::Line(1)).with_action(
            Action::assign(
                FactField::RiskScore,
                Expression::binary(
                    Expression::field(FactField::RiskScore),
                    Operator::Add,
                    Expression::binary(
                        Expression::literal(20.0),
                        Operator::Add,
                        Expression::literal(30.0),
                    ),
                ),
            ),
        );

        let folded = folder.fold_rule(rule);
        assert_eq!(
            folded.actions[0],
            Action::assign(
                FactField::RiskScore,
                Expression::binary(
                    Expression::field(FactField::RiskScore),
                    Operator::Add,
                    Expression::literal(50.0),
                ),
            )
        );
    }
}
