//! Type checker
//!
//! Infers and validates the type of condition and action expressions
//! against the fact schema.

use crate::error::{CompileError, Result};
use verdict_core::ast::{Expression, Operator, UnaryOperator};
use verdict_core::{FactField, FieldType, Value};

/// Type information for expressions
#[derive(Debug, Clone, PartialEq)]
pub enum TypeInfo {
    Number,
    String,
    Boolean,
    Array(Box<TypeInfo>),
    /// `null`, or an empty list's element type
    Any,
}

impl TypeInfo {
    /// Type of a fact field
    pub fn of_field(field: FactField) -> Self {
        match field.field_type() {
            FieldType::Text => TypeInfo::String,
            FieldType::Integer | FieldType::Decimal => TypeInfo::Number,
            FieldType::Boolean => TypeInfo::Boolean,
        }
    }

    /// Check if this type is compatible with another type
    pub fn is_compatible_with(&self, other: &TypeInfo) -> bool {
        match (self, other) {
            (TypeInfo::Any, _) | (_, TypeInfo::Any) => true,
            (TypeInfo::Number, TypeInfo::Number) => true,
            (TypeInfo::String, TypeInfo::String) => true,
            (TypeInfo::Boolean, TypeInfo::Boolean) => true,
            (TypeInfo::Array(a), TypeInfo::Array(b)) => a.is_compatible_with(b),
            _ => false,
        }
    }

    /// Check if this type can be used in a numeric operation
    pub fn is_numeric(&self) -> bool {
        matches!(self, TypeInfo::Number | TypeInfo::Any)
    }

    /// Check if this type can be used in a boolean operation
    pub fn is_boolean(&self) -> bool {
        matches!(self, TypeInfo::Boolean | TypeInfo::Any)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, TypeInfo::String | TypeInfo::Any)
    }

    /// Whether a value of this type may be assigned to a field of `field_type`
    pub fn is_assignable_to(&self, field_type: FieldType) -> bool {
        match field_type {
            FieldType::Text => self.is_string(),
            FieldType::Integer | FieldType::Decimal => self.is_numeric(),
            FieldType::Boolean => self.is_boolean(),
        }
    }

    /// Name used in diagnostics
    pub fn name(&self) -> String {
        match self {
            TypeInfo::Number => "number".to_string(),
            TypeInfo::String => "string".to_string(),
            TypeInfo::Boolean => "boolean".to_string(),
            TypeInfo::Array(inner) => format!("list of {}", inner.name()),
            TypeInfo::Any => "null".to_string(),
        }
    }
}

/// Type checker
#[derive(Debug, Default)]
pub struct TypeChecker;

impl TypeChecker {
    /// Create a new type checker
    pub fn new() -> Self {
        Self
    }

    /// Infer and validate the type of an expression
    pub fn check_expression(&self, expr: &Expression) -> Result<TypeInfo> {
        match expr {
            Expression::Literal(value) => self.infer_literal_type(value),

            Expression::Field(field) => Ok(TypeInfo::of_field(*field)),

            Expression::Binary { left, op, right } => {
                let left_type = self.check_expression(left)?;
                let right_type = self.check_expression(right)?;
                self.check_binary_operation(&left_type, *op, &right_type)
            }

            Expression::Unary { op, operand } => {
                let operand_type = self.check_expression(operand)?;
                self.check_unary_operation(*op, &operand_type)
            }
        }
    }

    /// Infer the type of a literal value
    fn infer_literal_type(&self, value: &Value) -> Result<TypeInfo> {
        match value {
            Value::Number(_) => Ok(TypeInfo::Number),
            Value::String(_) => Ok(TypeInfo::String),
            Value::Bool(_) => Ok(TypeInfo::Boolean),
            Value::Null => Ok(TypeInfo::Any),
            Value::Array(items) => {
                let mut element = TypeInfo::Any;
                for item in items {
                    let item_type = self.infer_literal_type(item)?;
                    if matches!(item_type, TypeInfo::Array(_)) {
                        return Err(CompileError::TypeError(
                            "Nested lists are not supported".to_string(),
                        ));
                    }
                    if !element.is_compatible_with(&item_type) {
                        return Err(CompileError::TypeError(format!(
                            "List mixes {} and {} elements",
                            element.name(),
                            item_type.name()
                        )));
                    }
                    if element == TypeInfo::Any {
                        element = item_type;
                    }
                }
                Ok(TypeInfo::Array(Box::new(element)))
            }
        }
    }

    /// Check if a binary operation is valid for the given types
    fn check_binary_operation(
        &self,
        left: &TypeInfo,
        op: Operator,
        right: &TypeInfo,
    ) -> Result<TypeInfo> {
        match op {
            // Arithmetic operators require numeric operands
            Operator::Add | Operator::Sub | Operator::Mul | Operator::Div | Operator::Mod => {
                if !left.is_numeric() || !right.is_numeric() {
                    return Err(self.operand_error(left, op, right, "numeric"));
                }
                Ok(TypeInfo::Number)
            }

            Operator::Eq | Operator::Ne => {
                if matches!(left, TypeInfo::Array(_)) || matches!(right, TypeInfo::Array(_)) {
                    return Err(CompileError::TypeError(format!(
                        "'{}' cannot compare lists; use 'in' or 'not_in'",
                        op
                    )));
                }
                if !left.is_compatible_with(right) {
                    return Err(self.operand_error(left, op, right, "of the same type"));
                }
                Ok(TypeInfo::Boolean)
            }

            // Ordering is defined for numbers and for strings
            Operator::Gt | Operator::Ge | Operator::Lt | Operator::Le => {
                let ordered = (left.is_numeric() && right.is_numeric())
                    || (left.is_string() && right.is_string());
                if !ordered {
                    return Err(self.operand_error(left, op, right, "both numbers or both strings"));
                }
                Ok(TypeInfo::Boolean)
            }

            // Logical operators require boolean operands
            Operator::And | Operator::Or => {
                if !left.is_boolean() || !right.is_boolean() {
                    return Err(self.operand_error(left, op, right, "boolean"));
                }
                Ok(TypeInfo::Boolean)
            }

            Operator::Contains | Operator::StartsWith | Operator::EndsWith => {
                if !left.is_string() || !right.is_string() {
                    return Err(self.operand_error(left, op, right, "strings"));
                }
                Ok(TypeInfo::Boolean)
            }

            Operator::In | Operator::NotIn => match right {
                TypeInfo::Array(element) => {
                    if matches!(left, TypeInfo::Array(_)) || !left.is_compatible_with(element) {
                        return Err(CompileError::TypeError(format!(
                            "'{}' checks a {} against a {}",
                            op,
                            left.name(),
                            right.name()
                        )));
                    }
                    Ok(TypeInfo::Boolean)
                }
                _ => Err(CompileError::TypeError(format!(
                    "Right operand of '{}' must be a list, found {}",
                    op,
                    right.name()
                ))),
            },
        }
    }

    /// Check if a unary operation is valid for the given type
    fn check_unary_operation(&self, op: UnaryOperator, operand: &TypeInfo) -> Result<TypeInfo> {
        match op {
            UnaryOperator::Not => {
                if !operand.is_boolean() {
                    return Err(CompileError::TypeError(format!(
                        "'!' requires a boolean operand, found {}",
                        operand.name()
                    )));
                }
                Ok(TypeInfo::Boolean)
            }
            UnaryOperator::Negate => {
                if !operand.is_numeric() {
                    return Err(CompileError::TypeError(format!(
                        "'-' requires a numeric operand, found {}",
                        operand.name()
                    )));
                }
                Ok(TypeInfo::Number)
            }
        }
    }

    fn operand_error(&self, left: &TypeInfo, op: Operator, right: &TypeInfo, expected: &str) -> CompileError {
        CompileError::TypeError(format!(
            "Operands of '{}' must be {}, found {} and {}",
            op,
            expected,
            left.name(),
            right.name()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(f: FactField) -> Expression {
        Expression::field(f)
    }

    #[test]
    fn test_numeric_comparison() {
        let checker = TypeChecker::new();
        let expr = Expression::binary(field(FactField::Amount), Operator::Lt, Expression::literal(100.0));
        assert_eq!(checker.check_expression(&expr).unwrap(), TypeInfo::Boolean);
    }

    #[test]
    fn test_string_compared_with_number_fails() {
        let checker = TypeChecker::new();
        let expr = Expression::binary(field(FactField::Country), Operator::Eq, Expression::literal(5.0));
        assert!(matches!(
            checker.check_expression(&expr),
            Err(CompileError::TypeError(msg)) if msg.contains("string and number")
        ));
    }

    #[test]
    fn test_null_is_compatible() {
        let checker = TypeChecker::new();
        let expr = Expression::binary(
            field(FactField::RejectionReason),
            Operator::Ne,
            Expression::literal(Value::Null),
        );
        assert_eq!(checker.check_expression(&expr).unwrap(), TypeInfo::Boolean);
    }

    #[test]
    fn test_membership() {
        let checker = TypeChecker::new();
        let ok = Expression::binary(
            field(FactField::Country),
            Operator::In,
            Expression::literal(Value::Array(vec![Value::from("A"), Value::from("B")])),
        );
        assert!(checker.check_expression(&ok).is_ok());

        let wrong_element = Expression::binary(
            field(FactField::Amount),
            Operator::NotIn,
            Expression::literal(Value::Array(vec![Value::from("A")])),
        );
        assert!(checker.check_expression(&wrong_element).is_err());

        let not_a_list = Expression::binary(field(FactField::Country), Operator::In, Expression::literal("A"));
        assert!(checker.check_expression(&not_a_list).is_err());

        let mixed = Expression::literal(Value::Array(vec![Value::from("A"), Value::from(1.0)]));
        assert!(checker.check_expression(&mixed).is_err());
    }

    #[test]
    fn test_arithmetic_and_logic() {
        let checker = TypeChecker::new();
        let sum = Expression::binary(field(FactField::RiskScore), Operator::Add, Expression::literal(5.0));
        assert_eq!(checker.check_expression(&sum).unwrap(), TypeInfo::Number);

        let bad = Expression::binary(field(FactField::IsVip), Operator::And, field(FactField::Amount));
        assert!(checker.check_expression(&bad).is_err());

        let not = Expression::unary(UnaryOperator::Not, field(FactField::Status));
        assert!(checker.check_expression(&not).is_err());
    }

    #[test]
    fn test_assignability() {
        assert!(TypeInfo::Number.is_assignable_to(FieldType::Integer));
        assert!(TypeInfo::Any.is_assignable_to(FieldType::Text));
        assert!(!TypeInfo::String.is_assignable_to(FieldType::Decimal));
        assert!(!TypeInfo::Number.is_assignable_to(FieldType::Boolean));
    }
}
