//! Published rule sets
//!
//! The repository maps a rule-set name to the currently active
//! [`RuleSet`]. Publishing swaps one immutable map for another, so a reader
//! sees either the old or the new set for a name, never a mix, and a
//! reader holding an `Arc<RuleSet>` keeps it alive for as long as it needs.

use crate::error::{RepositoryError, RepositoryResult};
use crate::models::PublishedRuleSet;
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use verdict_core::RuleSet;

type PublishedMap = HashMap<String, Arc<PublishedRuleSet>>;

/// Registry of named, independently published rule sets
pub struct RuleRepository {
    published: ArcSwap<PublishedMap>,
}

impl Default for RuleRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleRepository {
    pub fn new() -> Self {
        Self {
            published: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    /// Make `rule_set` the active set for `name`.
    ///
    /// Returns the set it replaced, if any. Other names are untouched.
    pub fn publish(&self, name: &str, rule_set: impl Into<Arc<RuleSet>>) -> Option<Arc<RuleSet>> {
        let entry = Arc::new(PublishedRuleSet {
            rule_set: rule_set.into(),
            published_at: Utc::now(),
        });

        let previous = self.published.rcu(|current| {
            let mut next = PublishedMap::clone(current);
            next.insert(name.to_string(), Arc::clone(&entry));
            next
        });

        info!(
            rule_set = name,
            version = entry.rule_set.version(),
            rules = entry.rule_set.len(),
            "published rule set"
        );

        previous.get(name).map(|old| Arc::clone(&old.rule_set))
    }

    /// Current set for `name`, if one was ever published
    pub fn get(&self, name: &str) -> Option<Arc<RuleSet>> {
        self.published
            .load()
            .get(name)
            .map(|entry| Arc::clone(&entry.rule_set))
    }

    /// Like [`get`](Self::get), but absent is an error
    pub fn require(&self, name: &str) -> RepositoryResult<Arc<RuleSet>> {
        self.get(name).ok_or_else(|| RepositoryError::RuleSetNotFound {
            name: name.to_string(),
        })
    }

    /// Current set for `name` with its publication time
    pub fn published(&self, name: &str) -> Option<Arc<PublishedRuleSet>> {
        self.published.load().get(name).cloned()
    }

    pub fn last_published_at(&self, name: &str) -> Option<DateTime<Utc>> {
        self.published(name).map(|entry| entry.published_at)
    }

    /// Version to use for the next set published under `name`
    pub fn next_version(&self, name: &str) -> u64 {
        self.get(name).map(|set| set.version() + 1).unwrap_or(1)
    }

    /// Names with a published set, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.published.load().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.published.load().contains_key(name)
    }
}
