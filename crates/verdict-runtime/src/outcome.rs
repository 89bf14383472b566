//! Inference session results

use serde::{Deserialize, Serialize};
use verdict_core::Fact;

/// One entry of a firing trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiringRecord {
    /// Name of the rule that fired
    pub rule_name: String,
    /// Zero-based position of this firing in the session
    pub step: usize,
}

/// Result of running a session to its fixed point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceOutcome {
    /// Fact state after the last firing
    pub final_fact: Fact,

    /// Firings in the order they happened
    pub trace: Vec<FiringRecord>,

    /// Always `trace.len()`
    pub rules_fired: usize,
}

impl InferenceOutcome {
    pub(crate) fn new(final_fact: Fact, trace: Vec<FiringRecord>) -> Self {
        let rules_fired = trace.len();
        Self {
            final_fact,
            trace,
            rules_fired,
        }
    }

    /// Rule names in firing order; a rule that refired appears once per firing
    pub fn fired_rule_names(&self) -> Vec<String> {
        self.trace.iter().map(|r| r.rule_name.clone()).collect()
    }
}
