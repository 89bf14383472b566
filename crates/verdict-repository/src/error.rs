//! Error types for the repository layer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors that can occur during repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// No rule source with this name
    #[error("Rule source not found: {name}")]
    SourceNotFound { name: String },

    /// No rule set has ever been published under this name
    #[error("Rule set not found: {name}")]
    RuleSetNotFound { name: String },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid path provided
    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },

    /// A rule source name that cannot be stored
    #[error("Invalid rule source name '{name}': {reason}")]
    InvalidSourceName { name: String, reason: String },

    /// Rule source content is not UTF-8 text
    #[error("Rule source '{name}' is not valid UTF-8")]
    InvalidEncoding { name: String },
}

impl RepositoryError {
    /// Whether the error means "absent" rather than a failure
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RepositoryError::SourceNotFound { .. } | RepositoryError::RuleSetNotFound { .. }
        )
    }
}
