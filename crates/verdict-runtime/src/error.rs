//! Runtime error types

use thiserror::Error;
use verdict_core::CoreError;

/// The iteration ceiling of a session was reached.
///
/// Rule sets whose actions keep re-satisfying conditions end here instead of
/// looping forever. `recent_rules` holds the last rules fired, oldest first.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("inference did not reach a fixed point within {limit} firings; last fired: {}", .recent_rules.join(", "))]
pub struct RunawayInferenceError {
    pub limit: usize,
    pub recent_rules: Vec<String>,
}

/// Runtime error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Type error
    #[error("Type error: {0}")]
    TypeError(String),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Division by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Fact field could not be written
    #[error(transparent)]
    Fact(#[from] CoreError),

    /// A condition or action of one rule failed
    #[error("rule '{rule}': {message}")]
    Evaluation { rule: String, message: String },

    /// Iteration ceiling exceeded
    #[error(transparent)]
    Runaway(#[from] RunawayInferenceError),

    /// `run` was called before a fact was inserted
    #[error("No fact inserted into the session")]
    EmptyWorkingMemory,

    /// A second fact was inserted into a session
    #[error("Session already holds fact '{0}'")]
    WorkingMemoryOccupied(String),
}

impl RuntimeError {
    /// Attribute an expression error to the rule being evaluated
    pub fn in_rule(self, rule: &str) -> Self {
        match self {
            RuntimeError::Evaluation { .. } | RuntimeError::Runaway(_) => self,
            other => RuntimeError::Evaluation {
                rule: rule.to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
