//! Compiler error types

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use verdict_core::source::Location;

/// Compiler error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// Type error
    #[error("Type error: {0}")]
    TypeError(String),

    /// Structurally invalid rule
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    /// Action targets a field rules may not write
    #[error("Field '{0}' is read-only and cannot be assigned")]
    ReadOnlyAssignment(String),

    /// Rule name already used in the same batch
    #[error("Duplicate rule name '{name}' (first declared in {first_source})")]
    DuplicateRule { name: String, first_source: String },
}

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;

/// A single problem found while compiling a batch of sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Source name (file name)
    pub source: String,
    pub location: Location,
    pub message: String,
}

impl Diagnostic {
    pub fn new(source: impl Into<String>, location: Location, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            location,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Location::Source => write!(f, "{}: {}", self.source, self.message),
            location => write!(f, "{} {}: {}", self.source, location, self.message),
        }
    }
}

/// Every diagnostic of a failed compilation
#[derive(Error, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[error("compilation failed with {} diagnostic(s)", .diagnostics.len())]
pub struct CompilationReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl CompilationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report with a single diagnostic
    pub fn single(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Distinct names of the sources that have diagnostics
    pub fn sources(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = Vec::new();
        for diagnostic in &self.diagnostics {
            if !sources.contains(&diagnostic.source.as_str()) {
                sources.push(&diagnostic.source);
            }
        }
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::new("bad.rules", Location::Line(3), "Unknown field: x");
        assert_eq!(d.to_string(), "bad.rules line 3: Unknown field: x");

        let d = Diagnostic::new("rules", Location::Source, "no rule files found");
        assert_eq!(d.to_string(), "rules: no rule files found");
    }

    #[test]
    fn test_report_sources_are_distinct() {
        let mut report = CompilationReport::new();
        report.push(Diagnostic::new("a.rules", Location::Line(1), "x"));
        report.push(Diagnostic::new("b.csv", Location::Row(2), "y"));
        report.push(Diagnostic::new("a.rules", Location::Line(9), "z"));
        assert_eq!(report.len(), 3);
        assert_eq!(report.sources(), vec!["a.rules", "b.csv"]);
        assert_eq!(report.to_string(), "compilation failed with 3 diagnostic(s)");
    }
}
