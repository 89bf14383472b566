//! Builder pattern for DecisionEngine

use crate::builtin;
use crate::config::EngineConfig;
use crate::decision_engine::DecisionEngine;
use crate::error::Result;
use std::path::PathBuf;
use std::sync::Arc;
use verdict_core::RuleSource;
use verdict_repository::{FileSystemSourceStore, SourceStore};

/// Builder for DecisionEngine
///
/// # Example
///
/// ```rust,ignore
/// use verdict_sdk::DecisionEngineBuilder;
///
/// // Built-in rule packs, dynamic rules under ./rules/dynamic
/// let engine = DecisionEngineBuilder::new().build().await?;
///
/// // Custom static rules, dynamic rules kept in memory
/// let engine = DecisionEngineBuilder::new()
///     .without_builtin_rules()
///     .add_static_source(RuleSource::narrative("mine.rules", text))
///     .with_source_store(Arc::new(MemorySourceStore::new()))
///     .build()
///     .await?;
/// ```
pub struct DecisionEngineBuilder {
    config: EngineConfig,
    store: Option<Arc<dyn SourceStore>>,
    builtin_rules: bool,
    static_sources: Vec<RuleSource>,
    decision_tables: Vec<RuleSource>,
}

impl DecisionEngineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: EngineConfig::new(),
            store: None,
            builtin_rules: true,
            static_sources: Vec::new(),
            decision_tables: Vec::new(),
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Keep dynamic rule sources in this directory
    pub fn with_rules_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.rules_dir = dir.into();
        self
    }

    /// Keep dynamic rule sources in a custom store instead of `rules_dir`
    pub fn with_source_store(mut self, store: Arc<dyn SourceStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Do not compile the embedded rule packs
    pub fn without_builtin_rules(mut self) -> Self {
        self.builtin_rules = false;
        self
    }

    /// Add a source to the tiered `static` rule set
    pub fn add_static_source(mut self, source: RuleSource) -> Self {
        self.static_sources.push(source);
        self
    }

    /// Add a source to the `decision-table` rule set
    pub fn add_decision_table(mut self, source: RuleSource) -> Self {
        self.decision_tables.push(source);
        self
    }

    /// Build the engine
    pub async fn build(self) -> Result<DecisionEngine> {
        let store: Arc<dyn SourceStore> = match self.store {
            Some(store) => store,
            None => Arc::new(FileSystemSourceStore::create(&self.config.rules_dir).await?),
        };

        let mut static_sources = Vec::new();
        let mut decision_tables = Vec::new();
        if self.builtin_rules {
            static_sources.extend(builtin::static_sources());
            decision_tables.extend(builtin::decision_table_sources());
        }
        static_sources.extend(self.static_sources);
        decision_tables.extend(self.decision_tables);

        DecisionEngine::assemble(self.config, store, static_sources, decision_tables).await
    }
}

impl Default for DecisionEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
