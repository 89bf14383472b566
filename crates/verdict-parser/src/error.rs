//! Parser error types

use thiserror::Error;
use verdict_core::source::Location;

/// Parser error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Invalid expression syntax
    #[error("Invalid expression syntax: {0}")]
    InvalidExpression(String),

    /// Invalid operator
    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    /// Identifier that is not a field of the fact
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Invalid value for a rule attribute or table cell
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Structural error in a source (missing `end`, stray keyword, ...)
    #[error("{0}")]
    Syntax(String),

    /// Malformed decision table header or record
    #[error("Decision table error: {0}")]
    Table(String),

    /// Error attached to a position in its source
    #[error("{location}: {error}")]
    Located {
        location: Location,
        error: Box<ParseError>,
    },
}

impl ParseError {
    pub fn syntax(message: impl Into<String>) -> Self {
        ParseError::Syntax(message.into())
    }

    /// Attach a position; an already located error keeps its own
    pub fn at(self, location: Location) -> Self {
        match self {
            located @ ParseError::Located { .. } => located,
            error => ParseError::Located {
                location,
                error: Box::new(error),
            },
        }
    }

    /// Position of the error, `Location::Source` when unknown
    pub fn location(&self) -> Location {
        match self {
            ParseError::Located { location, .. } => *location,
            _ => Location::Source,
        }
    }

    /// Message without the position prefix
    pub fn message(&self) -> String {
        match self {
            ParseError::Located { error, .. } => error.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        ParseError::Table(err.to_string())
    }
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;
