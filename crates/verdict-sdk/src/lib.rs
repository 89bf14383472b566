//! Verdict SDK
//!
//! High-level API over the verdict rule engine: built-in tiered rules and
//! decision tables, a hot-reloaded dynamic rule set, and concurrent
//! transaction evaluation.

pub mod builder;
pub mod builtin;
pub mod config;
pub mod decision_engine;
pub mod error;
pub mod reload;

// Re-export main types
pub use builder::DecisionEngineBuilder;
pub use builtin::{DECISION_TABLE_RULE_SET, DYNAMIC_RULE_SET, STATIC_RULE_SET};
pub use config::EngineConfig;
pub use decision_engine::{
    BatchEntry, DecisionEngine, EvaluationResponse, ReloadOutcome, SourceListing,
};
pub use error::{Result, SdkError};
pub use reload::{DynamicState, HotReloadManager, ReloadSummary};

// Re-export commonly used types from dependencies
pub use verdict_compiler::{CompilationReport, Diagnostic};
pub use verdict_core::source::Location;
pub use verdict_core::{Fact, FactField, RuleSource, Tier, Value};
pub use verdict_runtime::{RefirePolicy, SessionConfig};
