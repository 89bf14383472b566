//! Forward-chaining inference session
//!
//! A session owns one fact and repeatedly fires the single best activated
//! rule until no rule is activated. Sessions are built per evaluation and
//! share nothing mutable; the rules they borrow are immutable.

use crate::engine::ExpressionEvaluator;
use crate::error::{Result, RunawayInferenceError, RuntimeError};
use crate::outcome::{FiringRecord, InferenceOutcome};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::{debug, warn};
use verdict_core::ast::Action;
use verdict_core::{Fact, Rule};

/// When a rule that already fired may fire again
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefirePolicy {
    /// A rule fires at most once per session
    Once,
    /// A fired rule is re-armed after an activation pass sees its condition
    /// false, and may fire again once the condition holds again
    #[default]
    OnReset,
}

/// Session limits and refire behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum number of firings before the session is aborted
    pub max_iterations: usize,
    pub refire_policy: RefirePolicy,
    /// Number of trailing rule names reported on a runaway
    pub runaway_window: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            refire_policy: RefirePolicy::default(),
            runaway_window: 10,
        }
    }
}

impl SessionConfig {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_refire_policy(mut self, refire_policy: RefirePolicy) -> Self {
        self.refire_policy = refire_policy;
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct RuleState {
    fired: bool,
    armed: bool,
}

/// Working memory plus agenda for one evaluation
pub struct InferenceSession<'a> {
    rules: &'a [Arc<Rule>],
    config: SessionConfig,
    working_memory: Option<Fact>,
}

impl<'a> InferenceSession<'a> {
    /// Create a session over `rules`, typically a tier subset of a rule set
    pub fn new(rules: &'a [Arc<Rule>], config: SessionConfig) -> Self {
        Self {
            rules,
            config,
            working_memory: None,
        }
    }

    /// Insert the fact to reason over. A session holds exactly one fact.
    pub fn insert(&mut self, fact: Fact) -> Result<()> {
        if let Some(existing) = &self.working_memory {
            return Err(RuntimeError::WorkingMemoryOccupied(existing.id.clone()));
        }
        self.working_memory = Some(fact);
        Ok(())
    }

    /// Fire rules until no rule is activated.
    ///
    /// Each step re-evaluates every candidate condition against the current
    /// fact, then fires the activated rule with the highest priority,
    /// earliest declaration breaking ties.
    pub fn run(self) -> Result<InferenceOutcome> {
        let mut fact = self.working_memory.ok_or(RuntimeError::EmptyWorkingMemory)?;
        let mut states = vec![
            RuleState {
                fired: false,
                armed: true,
            };
            self.rules.len()
        ];
        let mut trace: Vec<FiringRecord> = Vec::new();

        loop {
            let selected = Self::select(self.rules, &self.config, &mut states, &fact)?;
            let Some(index) = selected else {
                break;
            };
            let rule = &self.rules[index];

            if trace.len() >= self.config.max_iterations {
                let start = trace.len().saturating_sub(self.config.runaway_window);
                let recent_rules: Vec<String> =
                    trace[start..].iter().map(|r| r.rule_name.clone()).collect();
                warn!(
                    fact = %fact.id,
                    limit = self.config.max_iterations,
                    next_rule = %rule.name,
                    recent = ?recent_rules,
                    "inference exceeded iteration ceiling"
                );
                return Err(RunawayInferenceError {
                    limit: self.config.max_iterations,
                    recent_rules,
                }
                .into());
            }

            Self::fire(rule, &mut fact)?;
            states[index] = RuleState {
                fired: true,
                armed: false,
            };

            let step = trace.len();
            debug!(fact = %fact.id, rule = %rule.name, step, priority = rule.priority, "rule fired");
            trace.push(FiringRecord {
                rule_name: rule.name.clone(),
                step,
            });
        }

        debug!(fact = %fact.id, rules_fired = trace.len(), "inference reached fixed point");
        Ok(InferenceOutcome::new(fact, trace))
    }

    /// Compute the activation set and pick one rule from it
    fn select(
        rules: &[Arc<Rule>],
        config: &SessionConfig,
        states: &mut [RuleState],
        fact: &Fact,
    ) -> Result<Option<usize>> {
        let mut best: Option<usize> = None;

        for (index, rule) in rules.iter().enumerate() {
            let state = &mut states[index];
            if config.refire_policy == RefirePolicy::Once && state.fired {
                continue;
            }

            let active = ExpressionEvaluator::evaluate_condition(&rule.condition, fact)
                .map_err(|e| e.in_rule(&rule.name))?;
            if !active {
                state.armed = true;
                continue;
            }
            if !state.armed {
                continue;
            }

            let better = match best {
                None => true,
                Some(current) => Self::rank(rule, index) < Self::rank(&rules[current], current),
            };
            if better {
                best = Some(index);
            }
        }

        Ok(best)
    }

    fn rank(rule: &Rule, index: usize) -> (Reverse<i32>, usize, usize) {
        (Reverse(rule.priority), rule.ordinal, index)
    }

    /// Apply a rule's actions in order; later actions see earlier writes
    fn fire(rule: &Rule, fact: &mut Fact) -> Result<()> {
        for action in &rule.actions {
            match action {
                Action::Assign { field, value } => {
                    let value = ExpressionEvaluator::evaluate(value, fact)
                        .map_err(|e| e.in_rule(&rule.name))?;
                    fact.set(*field, value)
                        .map_err(|e| RuntimeError::from(e).in_rule(&rule.name))?;
                }
            }
        }
        Ok(())
    }
}

/// Run a fresh session for one fact
pub fn evaluate(fact: Fact, rules: &[Arc<Rule>], config: SessionConfig) -> Result<InferenceOutcome> {
    let mut session = InferenceSession::new(rules, config);
    session.insert(fact)?;
    session.run()
}
