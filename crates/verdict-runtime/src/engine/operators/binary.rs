//! Arithmetic and logical operator execution

use crate::error::{Result, RuntimeError};
use verdict_core::ast::Operator;
use verdict_core::Value;

/// Execute an arithmetic operation; null operands propagate null
pub(crate) fn execute_binary_op(left: &Value, op: Operator, right: &Value) -> Result<Value> {
    if left.is_null() || right.is_null() {
        tracing::trace!(?left, %op, ?right, "null in arithmetic, returning null");
        return Ok(Value::Null);
    }

    match (left, op, right) {
        (Value::Number(l), Operator::Add, Value::Number(r)) => Ok(Value::Number(l + r)),
        (Value::Number(l), Operator::Sub, Value::Number(r)) => Ok(Value::Number(l - r)),
        (Value::Number(l), Operator::Mul, Value::Number(r)) => Ok(Value::Number(l * r)),
        (Value::Number(l), Operator::Div, Value::Number(r)) => {
            if *r == 0.0 {
                Err(RuntimeError::DivisionByZero)
            } else {
                Ok(Value::Number(l / r))
            }
        }
        (Value::Number(l), Operator::Mod, Value::Number(r)) => {
            if *r == 0.0 {
                Err(RuntimeError::DivisionByZero)
            } else {
                Ok(Value::Number(l % r))
            }
        }

        _ => Err(RuntimeError::InvalidOperation(format!(
            "Cannot apply '{}' to {} and {}",
            op,
            left.type_name(),
            right.type_name()
        ))),
    }
}

/// Three-valued AND/OR: a null operand is "unknown".
///
/// `false && null` is false and `true || null` is true; otherwise a null
/// operand makes the result null.
pub(crate) fn execute_logical_op(left: &Value, op: Operator, right: &Value) -> Result<Value> {
    let as_logic = |value: &Value| match value {
        Value::Bool(b) => Ok(Some(*b)),
        Value::Null => Ok(None),
        other => Err(RuntimeError::TypeError(format!(
            "'{}' requires boolean operands, found {}",
            op,
            other.type_name()
        ))),
    };
    let (l, r) = (as_logic(left)?, as_logic(right)?);

    let result = match op {
        Operator::And => match (l, r) {
            (Some(false), _) | (_, Some(false)) => Some(false),
            (Some(true), Some(true)) => Some(true),
            _ => None,
        },
        Operator::Or => match (l, r) {
            (Some(true), _) | (_, Some(true)) => Some(true),
            (Some(false), Some(false)) => Some(false),
            _ => None,
        },
        _ => {
            return Err(RuntimeError::InvalidOperation(format!(
                "'{}' is not a logical operator",
                op
            )))
        }
    };

    Ok(result.map(Value::Bool).unwrap_or(Value::Null))
}
