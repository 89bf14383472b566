//! Verdict Runtime - forward-chaining inference over compiled rule sets
//!
//! This crate evaluates compiled rules against a transaction fact:
//! - Expression evaluation with three-valued null handling
//! - Inference sessions with priority-based conflict resolution
//! - Tier selection over a rule set

pub mod engine;
pub mod error;
pub mod outcome;
pub mod selector;
pub mod session;

// Re-export main types
pub use engine::ExpressionEvaluator;
pub use error::{Result, RunawayInferenceError, RuntimeError};
pub use outcome::{FiringRecord, InferenceOutcome};
pub use selector::{TierSelection, TierSelector};
pub use session::{evaluate, InferenceSession, RefirePolicy, SessionConfig};
