//! Unary operator execution

use crate::error::{Result, RuntimeError};
use verdict_core::ast::UnaryOperator;
use verdict_core::Value;

/// Execute a unary operation; a null operand stays null
pub(crate) fn execute_unary_op(operand: &Value, op: UnaryOperator) -> Result<Value> {
    match (op, operand) {
        (_, Value::Null) => Ok(Value::Null),
        (UnaryOperator::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOperator::Negate, Value::Number(n)) => Ok(Value::Number(-n)),
        _ => Err(RuntimeError::InvalidOperation(format!(
            "Cannot apply {:?} to {}",
            op,
            operand.type_name()
        ))),
    }
}
