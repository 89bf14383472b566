//! Parsed rule definition
//!
//! Both source formats normalize into this shape before semantic analysis.

use super::action::Action;
use super::expression::Expression;
use crate::ir::Tier;
use crate::source::Location;
use serde::{Deserialize, Serialize};

/// One condition clause and where it was written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    pub expression: Expression,
    pub location: Location,
}

impl Clause {
    pub fn new(expression: Expression, location: Location) -> Self {
        Self {
            expression,
            location,
        }
    }
}

/// A rule as written in a source, before semantic checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    /// Unique rule name
    pub name: String,

    /// Tier (package) the rule belongs to
    pub tier: Tier,

    /// Salience; higher fires first
    pub priority: i32,

    /// Condition clauses; the rule matches when all of them hold
    pub clauses: Vec<Clause>,

    /// Actions run, in order, when the rule fires
    pub actions: Vec<Action>,

    /// Location of each action, parallel to `actions`
    #[serde(default)]
    pub action_locations: Vec<Location>,

    /// Where the rule starts in its source
    pub location: Location,
}

impl RuleDefinition {
    /// Create a rule with a single condition clause at `location`
    pub fn new(name: impl Into<String>, condition: Expression, location: Location) -> Self {
        Self::from_clauses(name, vec![Clause::new(condition, location)], location)
    }

    /// Create a rule from its condition clauses, with default tier and priority
    pub fn from_clauses(name: impl Into<String>, clauses: Vec<Clause>, location: Location) -> Self {
        Self {
            name: name.into(),
            tier: Tier::General,
            priority: 0,
            clauses,
            actions: Vec::new(),
            action_locations: Vec::new(),
            location,
        }
    }

    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Append an action located at the rule header
    pub fn with_action(self, action: Action) -> Self {
        let location = self.location;
        self.with_action_at(action, location)
    }

    pub fn with_action_at(mut self, action: Action, location: Location) -> Self {
        self.actions.push(action);
        self.action_locations.push(location);
        self
    }

    /// Conjunction of every clause
    pub fn condition(&self) -> Expression {
        Expression::all(self.clauses.iter().map(|c| c.expression.clone()).collect())
    }

    /// Where action `index` was written, falling back to the rule header
    pub fn action_location(&self, index: usize) -> Location {
        self.action_locations
            .get(index)
            .copied()
            .unwrap_or(self.location)
    }
}
