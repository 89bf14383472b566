//! Hot reload of the dynamic rule set
//!
//! The dynamic set is compiled from every source in a [`SourceStore`]. Any
//! change (upload, delete, edit on disk) recompiles the whole store, and the
//! result is published only when the whole batch compiles.

use crate::builtin::DYNAMIC_RULE_SET;
use crate::error::Result;
use arc_swap::{ArcSwap, ArcSwapOption};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use verdict_compiler::{CompilationReport, Diagnostic, RuleCompiler};
use verdict_core::source::Location;
use verdict_repository::{
    validate_source_name, FileSystemSourceStore, RuleRepository, SourceFingerprint, SourceStore,
};

/// Lifecycle of the dynamic rule set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DynamicState {
    /// Nothing has compiled yet
    Empty,
    /// A reload is running; `active` is the version still being served
    Compiling { active: Option<u64> },
    Active { version: u64 },
}

impl DynamicState {
    /// Version currently served, if any
    pub fn active_version(&self) -> Option<u64> {
        match self {
            DynamicState::Empty => None,
            DynamicState::Compiling { active } => *active,
            DynamicState::Active { version } => Some(*version),
        }
    }
}

/// A successful reload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReloadSummary {
    pub version: u64,
    pub rules: usize,
    pub sources: Vec<String>,
    pub published_at: DateTime<Utc>,
}

/// Compiles and publishes the dynamic rule set
pub struct HotReloadManager {
    store: Arc<dyn SourceStore>,
    repository: Arc<RuleRepository>,
    compiler: RuleCompiler,
    state: ArcSwap<DynamicState>,
    /// Store fingerprint taken by the last reload of `store`
    observed: ArcSwapOption<SourceFingerprint>,
    /// Serializes reloads and source mutations
    reload_lock: Mutex<()>,
}

impl HotReloadManager {
    pub fn new(
        store: Arc<dyn SourceStore>,
        repository: Arc<RuleRepository>,
        compiler: RuleCompiler,
    ) -> Self {
        let state = match repository.get(DYNAMIC_RULE_SET) {
            Some(set) => DynamicState::Active {
                version: set.version(),
            },
            None => DynamicState::Empty,
        };

        Self {
            store,
            repository,
            compiler,
            state: ArcSwap::from_pointee(state),
            observed: ArcSwapOption::empty(),
            reload_lock: Mutex::new(()),
        }
    }

    /// Recompile the configured store
    pub async fn reload(&self) -> std::result::Result<ReloadSummary, CompilationReport> {
        let _guard = self.reload_lock.lock().await;
        self.reload_store().await
    }

    /// Recompile from every rule file in `dir` instead of the configured store
    pub async fn reload_from(
        &self,
        dir: impl AsRef<Path>,
    ) -> std::result::Result<ReloadSummary, CompilationReport> {
        let dir = dir.as_ref();
        let store = FileSystemSourceStore::new(dir).map_err(|e| {
            CompilationReport::single(Diagnostic::new(
                dir.display().to_string(),
                Location::Source,
                e.to_string(),
            ))
        })?;

        let _guard = self.reload_lock.lock().await;
        self.reload_locked(&store).await
    }

    /// Store a source, then recompile everything.
    ///
    /// The file stays stored even when the recompilation fails.
    pub async fn add_or_replace(&self, file_name: &str, content: &[u8]) -> Result<ReloadSummary> {
        validate_source_name(file_name)?;

        let _guard = self.reload_lock.lock().await;
        self.store.write(file_name, content).await?;
        info!(source = file_name, bytes = content.len(), "rule source uploaded");
        Ok(self.reload_store().await?)
    }

    /// Delete a source, then recompile everything
    pub async fn remove(&self, file_name: &str) -> Result<ReloadSummary> {
        let _guard = self.reload_lock.lock().await;
        self.store.remove(file_name).await?;
        info!(source = file_name, "rule source deleted");
        Ok(self.reload_store().await?)
    }

    pub async fn list_sources(&self) -> Result<Vec<String>> {
        Ok(self.store.list().await?)
    }

    pub fn has_active_set(&self) -> bool {
        self.repository.contains(DYNAMIC_RULE_SET)
    }

    /// Time of the last successful reload
    pub fn last_reload_timestamp(&self) -> Option<DateTime<Utc>> {
        self.repository.last_published_at(DYNAMIC_RULE_SET)
    }

    pub fn state(&self) -> DynamicState {
        **self.state.load()
    }

    /// Poll the store every `interval` and reload when its fingerprint
    /// differs from the one the last reload saw. Changes made through this
    /// manager are already reloaded and do not trigger a second reload.
    /// The task runs until the returned handle is aborted.
    pub fn spawn_watcher(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            if self.observed.load().is_none() {
                match self.store.fingerprint().await {
                    Ok(fingerprint) => self.observed.store(Some(Arc::new(fingerprint))),
                    Err(e) => warn!(error = %e, "initial rule source fingerprint failed"),
                }
            }
            info!(interval_ms = interval.as_millis() as u64, "watching rule sources");

            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let current = match self.store.fingerprint().await {
                    Ok(fingerprint) => fingerprint,
                    Err(e) => {
                        warn!(error = %e, "rule source fingerprint failed");
                        continue;
                    }
                };
                if self.observed.load().as_deref() == Some(&current) {
                    continue;
                }

                debug!(sources = current.len(), "rule sources changed");
                if let Err(report) = self.reload().await {
                    debug!(diagnostics = report.len(), "watched reload rejected");
                }
            }
        })
    }

    /// Reload the configured store, recording the fingerprint it was read at.
    /// Callers hold `reload_lock`.
    async fn reload_store(&self) -> std::result::Result<ReloadSummary, CompilationReport> {
        match self.store.fingerprint().await {
            Ok(fingerprint) => self.observed.store(Some(Arc::new(fingerprint))),
            Err(e) => warn!(error = %e, "rule source fingerprint failed"),
        }
        self.reload_locked(self.store.as_ref()).await
    }

    async fn reload_locked(
        &self,
        store: &dyn SourceStore,
    ) -> std::result::Result<ReloadSummary, CompilationReport> {
        let previous = self.state();
        self.state.store(Arc::new(DynamicState::Compiling {
            active: previous.active_version(),
        }));

        let result = self.compile_and_publish(store).await;

        let next = match &result {
            Ok(summary) => {
                info!(
                    version = summary.version,
                    rules = summary.rules,
                    sources = summary.sources.len(),
                    "dynamic rule set reloaded"
                );
                DynamicState::Active {
                    version: summary.version,
                }
            }
            Err(report) => {
                for diagnostic in &report.diagnostics {
                    error!(%diagnostic, "dynamic rule reload diagnostic");
                }
                warn!(
                    diagnostics = report.len(),
                    active_version = ?previous.active_version(),
                    "dynamic rule reload rejected, keeping active set"
                );
                match previous.active_version() {
                    Some(version) => DynamicState::Active { version },
                    None => DynamicState::Empty,
                }
            }
        };
        self.state.store(Arc::new(next));

        result
    }

    async fn compile_and_publish(
        &self,
        store: &dyn SourceStore,
    ) -> std::result::Result<ReloadSummary, CompilationReport> {
        let sources = store.load_all().await.map_err(|e| {
            CompilationReport::single(Diagnostic::new(DYNAMIC_RULE_SET, Location::Source, e.to_string()))
        })?;

        if sources.is_empty() {
            return Err(CompilationReport::single(Diagnostic::new(
                DYNAMIC_RULE_SET,
                Location::Source,
                "no rule files found",
            )));
        }

        let names: Vec<String> = sources.iter().map(|s| s.name.clone()).collect();
        let version = self.repository.next_version(DYNAMIC_RULE_SET);
        let compiler = self.compiler.clone();

        // Compilation is CPU-bound; keep it off the async workers
        let rule_set = tokio::task::spawn_blocking(move || {
            compiler.compile(DYNAMIC_RULE_SET, version, &sources)
        })
        .await
        .map_err(|e| {
            CompilationReport::single(Diagnostic::new(
                DYNAMIC_RULE_SET,
                Location::Source,
                format!("compilation task failed: {}", e),
            ))
        })??;

        let rules = rule_set.len();
        self.repository.publish(DYNAMIC_RULE_SET, rule_set);

        Ok(ReloadSummary {
            version,
            rules,
            sources: names,
            published_at: self
                .repository
                .last_published_at(DYNAMIC_RULE_SET)
                .unwrap_or_else(Utc::now),
        })
    }
}
