//! Immutable, versioned rule set

use crate::error::{CoreError, Result};
use crate::ir::{Rule, Tier};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A named, versioned collection of compiled rules, partitioned by tier.
///
/// Invariants (enforced by [`RuleSet::new`], the only constructor):
/// - rule names are unique
/// - every rule in the partition for tier `t` has `tier == t`
/// - `rules` keeps declaration order and each rule's `ordinal` is its index
#[derive(Debug)]
pub struct RuleSet {
    name: String,
    version: u64,
    created_at: DateTime<Utc>,
    rules: Vec<Arc<Rule>>,
    tier_index: HashMap<Tier, Vec<Arc<Rule>>>,
}

impl RuleSet {
    /// Build a rule set from rules in declaration order
    pub fn new(name: impl Into<String>, version: u64, rules: Vec<Rule>) -> Result<Self> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.name.as_str()) {
                return Err(CoreError::DuplicateRule(rule.name.clone()));
            }
        }

        let rules: Vec<Arc<Rule>> = rules
            .into_iter()
            .enumerate()
            .map(|(ordinal, mut rule)| {
                rule.ordinal = ordinal;
                Arc::new(rule)
            })
            .collect();

        let mut tier_index: HashMap<Tier, Vec<Arc<Rule>>> = HashMap::new();
        for rule in &rules {
            tier_index.entry(rule.tier).or_default().push(Arc::clone(rule));
        }

        Ok(Self {
            name: name.into(),
            version,
            created_at: Utc::now(),
            rules,
            tier_index,
        })
    }

    /// A rule set with no rules
    pub fn empty(name: impl Into<String>, version: u64) -> Self {
        Self {
            name: name.into(),
            version,
            created_at: Utc::now(),
            rules: Vec::new(),
            tier_index: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// All rules, in declaration order
    pub fn rules(&self) -> &[Arc<Rule>] {
        &self.rules
    }

    /// Rules of one tier, in declaration order; empty when the tier has none
    pub fn tier(&self, tier: Tier) -> &[Arc<Rule>] {
        self.tier_index
            .get(&tier)
            .map(|rules| rules.as_slice())
            .unwrap_or(&[])
    }

    /// Tiers that have at least one rule
    pub fn tiers(&self) -> Vec<Tier> {
        let mut tiers: Vec<Tier> = self.tier_index.keys().copied().collect();
        tiers.sort();
        tiers
    }

    pub fn rule(&self, name: &str) -> Option<&Arc<Rule>> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expression;

    fn rule(name: &str, tier: Tier) -> Rule {
        Rule {
            name: name.to_string(),
            tier,
            priority: 0,
            condition: Expression::literal(true),
            actions: Vec::new(),
            source: "test.rules".to_string(),
            ordinal: 99,
        }
    }

    #[test]
    fn test_ruleset_indexes_tiers() {
        let set = RuleSet::new(
            "static",
            1,
            vec![
                rule("a", Tier::Low),
                rule("b", Tier::High),
                rule("c", Tier::Low),
            ],
        )
        .unwrap();

        let low: Vec<&str> = set.tier(Tier::Low).iter().map(|r| r.name.as_str()).collect();
        assert_eq!(low, vec!["a", "c"]);
        assert!(set.tier(Tier::Medium).is_empty());
        assert_eq!(set.tiers(), vec![Tier::Low, Tier::High]);
        for (tier, rules) in &set.tier_index {
            assert!(rules.iter().all(|r| r.tier == *tier));
        }
    }

    #[test]
    fn test_ruleset_renumbers_ordinals() {
        let set = RuleSet::new("s", 1, vec![rule("a", Tier::Low), rule("b", Tier::Low)]).unwrap();
        assert_eq!(set.rules()[0].ordinal, 0);
        assert_eq!(set.rules()[1].ordinal, 1);
        assert_eq!(set.rule("b").map(|r| r.ordinal), Some(1));
    }

    #[test]
    fn test_ruleset_rejects_duplicate_names() {
        let err = RuleSet::new("s", 1, vec![rule("a", Tier::Low), rule("a", Tier::High)])
            .unwrap_err();
        assert_eq!(err, CoreError::DuplicateRule("a".to_string()));
    }

    #[test]
    fn test_empty_ruleset() {
        let set = RuleSet::empty("dynamic", 3);
        assert!(set.is_empty());
        assert_eq!(set.version(), 3);
        assert!(set.tier(Tier::Low).is_empty());
    }
}
