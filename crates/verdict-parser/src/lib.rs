//! Verdict Parser - rule source parsers for the verdict rule engine
//!
//! This crate turns rule source text into parsed rule definitions:
//! - narrative sources (`rule "..." when ... then ... end`)
//! - CSV decision tables
//! - the expression language shared by both

pub mod decision_table_parser;
pub mod error;
pub mod expression_parser;
pub mod narrative_parser;

// Re-export main parser types
pub use decision_table_parser::DecisionTableParser;
pub use error::{ParseError, Result};
pub use expression_parser::ExpressionParser;
pub use narrative_parser::NarrativeParser;

use verdict_core::ast::RuleDefinition;
use verdict_core::{RuleSource, SourceFormat};

/// Parse one source with the parser matching its format
pub fn parse_source(source: &RuleSource) -> std::result::Result<Vec<RuleDefinition>, Vec<ParseError>> {
    match source.format {
        SourceFormat::Narrative => NarrativeParser::parse(&source.text),
        SourceFormat::DecisionTable => DecisionTableParser::parse(&source.text),
    }
}
