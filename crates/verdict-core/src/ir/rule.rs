//! Compiled rule

use crate::ast::{Action, Expression, RuleDefinition};
use crate::ir::Tier;
use serde::{Deserialize, Serialize};

/// Immutable unit of inference: a condition over the fact plus the actions
/// that mutate it when the rule fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique rule name within its rule set
    pub name: String,

    pub tier: Tier,

    /// Salience; higher fires first
    pub priority: i32,

    pub condition: Expression,

    pub actions: Vec<Action>,

    /// Name of the source the rule was compiled from
    pub source: String,

    /// Declaration order across the compiled batch (tie-break for equal priority)
    pub ordinal: usize,
}

impl Rule {
    /// Lower a parsed definition into a compiled rule
    pub fn from_definition(definition: RuleDefinition, source: impl Into<String>) -> Self {
        let condition = definition.condition();
        Self {
            name: definition.name,
            tier: definition.tier,
            priority: definition.priority,
            condition,
            actions: definition.actions,
            source: source.into(),
            ordinal: 0,
        }
    }
}
