//! Verdict Core - Core types and definitions for the verdict rule engine
//!
//! This crate provides the fundamental types used across the verdict crates:
//! - Value types and the transaction fact schema
//! - AST (Abstract Syntax Tree) definitions for conditions and actions
//! - IR (compiled rules and immutable rule sets)
//! - Rule source descriptors
//! - Error types

pub mod ast;
pub mod error;
pub mod fact;
pub mod ir;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use error::CoreError;
pub use fact::Fact;
pub use ir::{Rule, RuleSet, Tier};
pub use source::{RuleSource, SourceFormat};
pub use types::{FactField, FieldType, Value};
