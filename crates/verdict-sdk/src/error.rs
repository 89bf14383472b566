//! SDK error types

use thiserror::Error;
use verdict_compiler::CompilationReport;
use verdict_repository::RepositoryError;
use verdict_runtime::RuntimeError;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Rule sources failed to compile
    #[error(transparent)]
    Compilation(#[from] CompilationReport),

    /// Evaluation of one fact failed
    #[error("Runtime error: {0}")]
    RuntimeError(#[from] RuntimeError),

    /// Rule storage or lookup failed
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// A background task panicked or was cancelled
    #[error("Task failed: {0}")]
    TaskFailed(String),
}

impl SdkError {
    /// Whether the error means a source or rule set is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, SdkError::Repository(e) if e.is_not_found())
    }
}

impl From<config::ConfigError> for SdkError {
    fn from(err: config::ConfigError) -> Self {
        SdkError::ConfigError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for SdkError {
    fn from(err: tokio::task::JoinError) -> Self {
        SdkError::TaskFailed(err.to_string())
    }
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let error = SdkError::ConfigError("Invalid configuration".to_string());
        assert!(error.to_string().contains("Configuration error"));
        assert!(error.to_string().contains("Invalid configuration"));
    }

    #[test]
    fn test_not_found() {
        let error: SdkError = RepositoryError::RuleSetNotFound {
            name: "dynamic".to_string(),
        }
        .into();
        assert!(error.is_not_found());
        assert_eq!(error.to_string(), "Rule set not found: dynamic");

        let error = SdkError::TaskFailed("cancelled".to_string());
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_compilation_is_transparent() {
        let error: SdkError = CompilationReport::new().into();
        assert_eq!(error.to_string(), "compilation failed with 0 diagnostic(s)");
    }
}
