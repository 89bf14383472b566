//! Data models for the repository layer

use crate::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::SystemTime;
use verdict_core::{RuleSet, SourceFormat};

/// A rule set together with the moment it became active
#[derive(Debug, Clone)]
pub struct PublishedRuleSet {
    pub rule_set: Arc<RuleSet>,
    pub published_at: DateTime<Utc>,
}

/// Change-detection stamp of one stored source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceStamp {
    pub name: String,
    pub len: u64,
    pub modified: Option<SystemTime>,
    /// Store-local write counter, for stores without modification times
    pub revision: u64,
}

/// Stamps of every source in a store, sorted by name.
///
/// Two equal fingerprints mean nothing was added, removed or rewritten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceFingerprint(pub Vec<SourceStamp>);

impl SourceFingerprint {
    pub fn new(mut stamps: Vec<SourceStamp>) -> Self {
        stamps.sort_by(|a, b| a.name.cmp(&b.name));
        Self(stamps)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Check that `name` is a bare file name of a known rule source format
pub fn validate_source_name(name: &str) -> RepositoryResult<SourceFormat> {
    let invalid = |reason: &str| RepositoryError::InvalidSourceName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.trim().is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(invalid("path separators are not allowed"));
    }
    if name.contains("..") {
        return Err(invalid("'..' is not allowed"));
    }
    if name.starts_with('.') {
        return Err(invalid("hidden files are not allowed"));
    }
    SourceFormat::from_file_name(name)
        .ok_or_else(|| invalid("expected a .rules, .drl or .csv file"))
}
