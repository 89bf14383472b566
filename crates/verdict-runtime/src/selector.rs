//! Tier selection
//!
//! Maps a caller-supplied tier name onto a partition of a rule set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use verdict_core::{Rule, RuleSet, Tier};

/// Resolved tier request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TierSelection {
    /// Every rule of the set, in declaration order
    All,
    Tier(Tier),
}

impl TierSelection {
    /// Resolve a tier name. `LOW`, `MEDIUM` and `HIGH` (any case) select a
    /// partition; `ALL`, an absent name or anything unrecognized selects
    /// every rule.
    pub fn resolve(name: Option<&str>) -> Self {
        name.and_then(Tier::parse)
            .filter(|tier| Tier::SELECTABLE.contains(tier))
            .map(TierSelection::Tier)
            .unwrap_or(TierSelection::All)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TierSelection::All => "ALL",
            TierSelection::Tier(tier) => tier.as_str(),
        }
    }
}

impl fmt::Display for TierSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selects the rules a session runs over
pub struct TierSelector;

impl TierSelector {
    /// Rules for a tier name; see [`TierSelection::resolve`]
    pub fn select<'a>(tier: Option<&str>, rule_set: &'a RuleSet) -> &'a [Arc<Rule>] {
        Self::select_resolved(TierSelection::resolve(tier), rule_set)
    }

    pub fn select_resolved(selection: TierSelection, rule_set: &RuleSet) -> &[Arc<Rule>] {
        match selection {
            TierSelection::All => rule_set.rules(),
            TierSelection::Tier(tier) => rule_set.tier(tier),
        }
    }
}
