//! Comparison and membership operator execution

use crate::error::{Result, RuntimeError};
use verdict_core::ast::Operator;
use verdict_core::Value;

/// Execute a comparison, membership or string-matching operation
pub(crate) fn execute_compare(left: &Value, op: Operator, right: &Value) -> Result<bool> {
    // Null compared to anything is false, so a missing field never matches
    if left.is_null() || right.is_null() {
        tracing::trace!(?left, %op, ?right, "null comparison, returning false");
        return Ok(false);
    }

    match (left, op, right) {
        (Value::Number(l), Operator::Eq, Value::Number(r)) => Ok(l == r),
        (Value::Number(l), Operator::Ne, Value::Number(r)) => Ok(l != r),
        (Value::Number(l), Operator::Gt, Value::Number(r)) => Ok(l > r),
        (Value::Number(l), Operator::Ge, Value::Number(r)) => Ok(l >= r),
        (Value::Number(l), Operator::Lt, Value::Number(r)) => Ok(l < r),
        (Value::Number(l), Operator::Le, Value::Number(r)) => Ok(l <= r),

        (Value::String(l), Operator::Eq, Value::String(r)) => Ok(l == r),
        (Value::String(l), Operator::Ne, Value::String(r)) => Ok(l != r),
        (Value::String(l), Operator::Gt, Value::String(r)) => Ok(l > r),
        (Value::String(l), Operator::Ge, Value::String(r)) => Ok(l >= r),
        (Value::String(l), Operator::Lt, Value::String(r)) => Ok(l < r),
        (Value::String(l), Operator::Le, Value::String(r)) => Ok(l <= r),

        (Value::Bool(l), Operator::Eq, Value::Bool(r)) => Ok(l == r),
        (Value::Bool(l), Operator::Ne, Value::Bool(r)) => Ok(l != r),

        (Value::String(l), Operator::Contains, Value::String(r)) => Ok(l.contains(r.as_str())),
        (Value::String(l), Operator::StartsWith, Value::String(r)) => Ok(l.starts_with(r.as_str())),
        (Value::String(l), Operator::EndsWith, Value::String(r)) => Ok(l.ends_with(r.as_str())),

        (val, Operator::In, Value::Array(arr)) => Ok(arr.iter().any(|v| v == val)),
        (val, Operator::NotIn, Value::Array(arr)) => Ok(!arr.iter().any(|v| v == val)),

        _ => Err(RuntimeError::InvalidOperation(format!(
            "Cannot compare {} and {} with '{}'",
            left.type_name(),
            right.type_name(),
            op
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_never_matches() {
        for op in [Operator::Eq, Operator::Ne, Operator::Lt, Operator::In, Operator::NotIn] {
            assert!(!execute_compare(&Value::Null, op, &Value::Number(1.0)).unwrap());
        }
    }

    #[test]
    fn test_membership() {
        let list = Value::Array(vec![Value::from("US"), Value::from("CA")]);
        assert!(execute_compare(&Value::from("CA"), Operator::In, &list).unwrap());
        assert!(execute_compare(&Value::from("FR"), Operator::NotIn, &list).unwrap());
    }

    #[test]
    fn test_string_ordering_and_matching() {
        assert!(execute_compare(&Value::from("b"), Operator::Gt, &Value::from("a")).unwrap());
        assert!(execute_compare(&Value::from("M-100"), Operator::StartsWith, &Value::from("M-")).unwrap());
    }

    #[test]
    fn test_mismatched_types_error() {
        assert!(execute_compare(&Value::from("1"), Operator::Lt, &Value::Number(2.0)).is_err());
    }
}
