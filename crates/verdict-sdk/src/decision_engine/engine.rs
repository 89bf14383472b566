//! DecisionEngine implementation

use super::types::{BatchEntry, EvaluationResponse, ReloadOutcome, SourceListing};
use crate::builtin::{DECISION_TABLE_RULE_SET, DYNAMIC_RULE_SET, STATIC_RULE_SET};
use crate::config::EngineConfig;
use crate::error::{Result, SdkError};
use crate::reload::{HotReloadManager, ReloadSummary};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use verdict_compiler::{CompilationReport, RuleCompiler};
use verdict_core::{Fact, RuleSet, RuleSource};
use verdict_repository::{RuleRepository, SourceStore};
use verdict_runtime::{SessionConfig, TierSelection, TierSelector};

/// Evaluates transactions against the static, decision-table and dynamic
/// rule sets
pub struct DecisionEngine {
    config: EngineConfig,
    session_config: SessionConfig,
    repository: Arc<RuleRepository>,
    reload_manager: Arc<HotReloadManager>,
    watcher: Option<JoinHandle<()>>,
}

impl DecisionEngine {
    /// Create an engine with the built-in rule packs and a rules directory
    /// at `config.rules_dir`
    pub async fn new(config: EngineConfig) -> Result<Self> {
        crate::builder::DecisionEngineBuilder::new()
            .with_config(config)
            .build()
            .await
    }

    pub(crate) async fn assemble(
        config: EngineConfig,
        store: Arc<dyn SourceStore>,
        static_sources: Vec<RuleSource>,
        decision_tables: Vec<RuleSource>,
    ) -> Result<Self> {
        let repository = Arc::new(RuleRepository::new());
        let compiler = RuleCompiler::with_options(config.compiler_options());

        // Broken built-in packs are a startup error
        let static_set = compiler.compile(STATIC_RULE_SET, 1, &static_sources)?;
        repository.publish(STATIC_RULE_SET, static_set);
        let table_set = compiler.compile(DECISION_TABLE_RULE_SET, 1, &decision_tables)?;
        repository.publish(DECISION_TABLE_RULE_SET, table_set);

        let reload_manager = Arc::new(HotReloadManager::new(
            store,
            Arc::clone(&repository),
            compiler,
        ));

        if config.load_dynamic_on_start {
            if let Err(report) = reload_manager.reload().await {
                warn!(
                    diagnostics = report.len(),
                    "no dynamic rule set active at startup"
                );
            }
        }

        let watcher = config
            .watch_interval()
            .map(|interval| Arc::clone(&reload_manager).spawn_watcher(interval));

        info!(
            static_rules = repository.get(STATIC_RULE_SET).map(|s| s.len()).unwrap_or(0),
            decision_table_rules = repository
                .get(DECISION_TABLE_RULE_SET)
                .map(|s| s.len())
                .unwrap_or(0),
            dynamic_active = reload_manager.has_active_set(),
            "decision engine initialized"
        );

        Ok(Self {
            session_config: config.session_config(),
            config,
            repository,
            reload_manager,
            watcher,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn repository(&self) -> &Arc<RuleRepository> {
        &self.repository
    }

    pub fn reload_manager(&self) -> &Arc<HotReloadManager> {
        &self.reload_manager
    }

    // ========== Evaluation ==========

    /// Evaluate a fact against the tiered built-in rules. `LOW`, `MEDIUM`
    /// or `HIGH` restrict the rules to that tier; anything else runs all.
    pub fn evaluate(&self, fact: Fact, tier: Option<&str>) -> Result<EvaluationResponse> {
        self.evaluate_in(STATIC_RULE_SET, fact, tier)
    }

    /// Evaluate a fact against every built-in decision table
    pub fn evaluate_decision_table(&self, fact: Fact) -> Result<EvaluationResponse> {
        self.evaluate_in(DECISION_TABLE_RULE_SET, fact, None)
    }

    /// Evaluate a fact against the hot-reloaded rules; not found while no
    /// dynamic set has ever compiled
    pub fn evaluate_dynamic(&self, fact: Fact) -> Result<EvaluationResponse> {
        self.evaluate_in(DYNAMIC_RULE_SET, fact, None)
    }

    /// Evaluate a fact against any published rule set
    pub fn evaluate_in(
        &self,
        rule_set: &str,
        fact: Fact,
        tier: Option<&str>,
    ) -> Result<EvaluationResponse> {
        let set = self.repository.require(rule_set)?;
        run_session(&set, TierSelection::resolve(tier), fact, self.session_config)
    }

    /// Evaluate independent facts concurrently against the tiered rules
    pub async fn evaluate_batch(&self, facts: Vec<Fact>, tier: Option<&str>) -> Result<Vec<BatchEntry>> {
        self.evaluate_batch_in(STATIC_RULE_SET, facts, tier).await
    }

    /// Evaluate independent facts concurrently against any published rule set.
    ///
    /// At most `batch_concurrency` facts run at once. Results arrive in
    /// completion order; a failed fact does not fail the batch.
    pub async fn evaluate_batch_in(
        &self,
        rule_set: &str,
        facts: Vec<Fact>,
        tier: Option<&str>,
    ) -> Result<Vec<BatchEntry>> {
        let set = self.repository.require(rule_set)?;
        let selection = TierSelection::resolve(tier);
        let session_config = self.session_config;
        let total = facts.len();

        let entries: Vec<BatchEntry> = stream::iter(facts)
            .map(|fact| {
                let set = Arc::clone(&set);
                let transaction_id = fact.id.clone();
                let task = tokio::spawn(async move {
                    run_session(&set, selection, fact, session_config)
                });
                async move {
                    let result = match task.await {
                        Ok(result) => result,
                        Err(e) => Err(SdkError::from(e)),
                    };
                    BatchEntry::new(transaction_id, result)
                }
            })
            .buffer_unordered(self.config.batch_concurrency.max(1))
            .collect()
            .await;

        let failed = entries.iter().filter(|e| e.error.is_some()).count();
        info!(rule_set, facts = total, failed, tier = %selection, "batch evaluated");
        Ok(entries)
    }

    // ========== Rule source management ==========

    /// Store a dynamic rule source and recompile the dynamic set.
    ///
    /// A compilation failure is reported in the outcome; invalid names and
    /// storage failures are errors.
    pub async fn upload(&self, file_name: &str, content: &[u8]) -> Result<ReloadOutcome> {
        let result = self.reload_manager.add_or_replace(file_name, content).await;
        self.outcome(result)
    }

    /// Delete a dynamic rule source and recompile the dynamic set
    pub async fn delete(&self, file_name: &str) -> Result<ReloadOutcome> {
        let result = self.reload_manager.remove(file_name).await;
        self.outcome(result)
    }

    /// Recompile the dynamic set from its store
    pub async fn reload(&self) -> ReloadOutcome {
        let result = self.reload_manager.reload().await;
        ReloadOutcome::from_reload(result, self.reload_manager.state().active_version())
    }

    pub async fn list_sources(&self) -> Result<SourceListing> {
        Ok(SourceListing {
            names: self.reload_manager.list_sources().await?,
            active_version: self.reload_manager.last_reload_timestamp(),
        })
    }

    fn outcome(&self, result: Result<ReloadSummary>) -> Result<ReloadOutcome> {
        let result: std::result::Result<ReloadSummary, CompilationReport> = match result {
            Ok(summary) => Ok(summary),
            Err(SdkError::Compilation(report)) => Err(report),
            Err(other) => return Err(other),
        };
        Ok(ReloadOutcome::from_reload(
            result,
            self.reload_manager.state().active_version(),
        ))
    }
}

impl Drop for DecisionEngine {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
    }
}

/// One fresh inference session for one fact
fn run_session(
    rule_set: &RuleSet,
    selection: TierSelection,
    mut fact: Fact,
    session_config: SessionConfig,
) -> Result<EvaluationResponse> {
    let started = Instant::now();
    fact.prepare_for_evaluation();
    let transaction_id = fact.id.clone();

    let rules = TierSelector::select_resolved(selection, rule_set);
    let outcome = verdict_runtime::evaluate(fact, rules, session_config).map_err(|e| {
        warn!(transaction = %transaction_id, rule_set = rule_set.name(), error = %e, "evaluation failed");
        e
    })?;
    let micros = started.elapsed().as_micros() as u64;

    debug!(
        transaction = %transaction_id,
        rule_set = rule_set.name(),
        tier = %selection,
        rules_fired = outcome.rules_fired,
        micros,
        "transaction evaluated"
    );

    Ok(EvaluationResponse::from_outcome(
        outcome,
        selection.as_str(),
        rule_set.name(),
        rule_set.version(),
        micros,
    ))
}
