//! Rule source descriptors
//!
//! A rule source is one unit of rule text (usually one file) together with
//! the format it is written in. The format is resolved once, from the file
//! extension, and never re-inspected afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Format of a rule source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// `rule "..." when ... then ... end` blocks (`.rules`, `.drl`)
    Narrative,
    /// CSV decision table (`.csv`)
    DecisionTable,
}

impl SourceFormat {
    /// Classify a file by extension. Returns `None` for non-rule files.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())?
            .to_ascii_lowercase();
        match ext.as_str() {
            "rules" | "drl" => Some(SourceFormat::Narrative),
            "csv" => Some(SourceFormat::DecisionTable),
            _ => None,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Narrative => f.write_str("narrative"),
            SourceFormat::DecisionTable => f.write_str("decision-table"),
        }
    }
}

/// One unit of rule text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSource {
    /// Source name (file name for directory-backed sources)
    pub name: String,
    /// Raw text
    pub text: String,
    pub format: SourceFormat,
}

impl RuleSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>, format: SourceFormat) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            format,
        }
    }

    pub fn narrative(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name, text, SourceFormat::Narrative)
    }

    pub fn decision_table(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name, text, SourceFormat::DecisionTable)
    }

    /// Build a source from a file name, classifying it by extension
    pub fn from_file(name: impl Into<String>, text: impl Into<String>) -> Option<Self> {
        let name = name.into();
        let format = SourceFormat::from_file_name(&name)?;
        Some(Self::new(name, text, format))
    }
}

/// Position of a rule or a diagnostic inside a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "at", rename_all = "snake_case")]
pub enum Location {
    /// 1-based line of a narrative source
    Line(usize),
    /// 1-based line of a decision-table row
    Row(usize),
    /// Applies to the source as a whole
    Source,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Line(n) => write!(f, "line {}", n),
            Location::Row(n) => write!(f, "row {}", n),
            Location::Source => f.write_str("source"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_file_name() {
        assert_eq!(
            SourceFormat::from_file_name("fraud.rules"),
            Some(SourceFormat::Narrative)
        );
        assert_eq!(
            SourceFormat::from_file_name("legacy.DRL"),
            Some(SourceFormat::Narrative)
        );
        assert_eq!(
            SourceFormat::from_file_name("country-risk.csv"),
            Some(SourceFormat::DecisionTable)
        );
        assert_eq!(SourceFormat::from_file_name("notes.txt"), None);
        assert_eq!(SourceFormat::from_file_name("no_extension"), None);
    }

    #[test]
    fn test_source_from_file() {
        let source = RuleSource::from_file("tiers.csv", "name,then status").unwrap();
        assert_eq!(source.format, SourceFormat::DecisionTable);
        assert!(RuleSource::from_file("readme.md", "").is_none());
    }

    #[test]
    fn test_location_display() {
        assert_eq!(Location::Line(4).to_string(), "line 4");
        assert_eq!(Location::Row(2).to_string(), "row 2");
    }
}
