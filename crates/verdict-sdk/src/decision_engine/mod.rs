//! DecisionEngine - Main API for evaluating transactions
//!
//! The module is organized into:
//! - `types`: Response types (EvaluationResponse, ReloadOutcome, SourceListing)
//! - `engine`: Core DecisionEngine implementation
//! - `tests`: Unit tests (test-only)

mod engine;
mod types;

// Re-export public types
pub use engine::DecisionEngine;
pub use types::{BatchEntry, EvaluationResponse, ReloadOutcome, SourceListing};

// Tests module (only compiled in test mode)
#[cfg(test)]
mod tests;
