//! Configuration types for DecisionEngine

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use verdict_compiler::CompilerOptions;
use verdict_runtime::{RefirePolicy, SessionConfig};

fn default_rules_dir() -> PathBuf {
    PathBuf::from("rules/dynamic")
}

fn default_max_iterations() -> usize {
    SessionConfig::default().max_iterations
}

fn default_runaway_window() -> usize {
    SessionConfig::default().runaway_window
}

fn default_batch_concurrency() -> usize {
    100
}

fn default_true() -> bool {
    true
}

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory of hot-reloaded rule sources (default: "rules/dynamic")
    #[serde(default = "default_rules_dir")]
    pub rules_dir: PathBuf,

    /// Firing ceiling of one inference session
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Whether a fired rule may fire again after its condition resets
    #[serde(default)]
    pub refire_policy: RefirePolicy,

    /// Rule names reported when a session runs away
    #[serde(default = "default_runaway_window")]
    pub runaway_window: usize,

    /// Facts evaluated at once by a batch request
    #[serde(default = "default_batch_concurrency")]
    pub batch_concurrency: usize,

    /// Poll the rules directory for changes at this interval
    #[serde(default)]
    pub watch_interval_ms: Option<u64>,

    /// Compile the rules directory during engine construction
    #[serde(default = "default_true")]
    pub load_dynamic_on_start: bool,

    #[serde(default = "default_true")]
    pub enable_constant_folding: bool,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            rules_dir: default_rules_dir(),
            max_iterations: default_max_iterations(),
            refire_policy: RefirePolicy::default(),
            runaway_window: default_runaway_window(),
            batch_concurrency: default_batch_concurrency(),
            watch_interval_ms: None,
            load_dynamic_on_start: true,
            enable_constant_folding: true,
        }
    }

    /// Load configuration from an optional `config/verdict` file and
    /// `VERDICT_*` environment variables, after reading `.env` if present
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/verdict").required(false))
            .add_source(config::Environment::with_prefix("VERDICT").try_parsing(true))
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        tracing::debug!(?loaded, "loaded engine configuration");
        Ok(loaded)
    }

    pub fn with_rules_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.rules_dir = dir.into();
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_refire_policy(mut self, policy: RefirePolicy) -> Self {
        self.refire_policy = policy;
        self
    }

    pub fn with_batch_concurrency(mut self, concurrency: usize) -> Self {
        self.batch_concurrency = concurrency;
        self
    }

    pub fn with_watch_interval(mut self, interval: Duration) -> Self {
        self.watch_interval_ms = Some(interval.as_millis() as u64);
        self
    }

    pub fn load_dynamic_on_start(mut self, enable: bool) -> Self {
        self.load_dynamic_on_start = enable;
        self
    }

    /// Session settings derived from this configuration
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            max_iterations: self.max_iterations,
            refire_policy: self.refire_policy,
            runaway_window: self.runaway_window,
        }
    }

    pub fn compiler_options(&self) -> CompilerOptions {
        CompilerOptions {
            enable_semantic_analysis: true,
            enable_constant_folding: self.enable_constant_folding,
        }
    }

    pub fn watch_interval(&self) -> Option<Duration> {
        self.watch_interval_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
