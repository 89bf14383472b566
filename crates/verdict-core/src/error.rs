//! Error types for verdict core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field '{0}' is read-only")]
    ReadOnlyField(String),

    #[error("Duplicate rule name '{0}' in rule set")]
    DuplicateRule(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
