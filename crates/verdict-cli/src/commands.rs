//! Subcommand implementations

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use verdict_compiler::RuleCompiler;
use verdict_core::{Fact, RuleSource};
use verdict_repository::{FileSystemSourceStore, MemorySourceStore, SourceStore};
use verdict_sdk::{DecisionEngine, DecisionEngineBuilder, EngineConfig, EvaluationResponse};

/// Rule set an `evaluate` run is served by
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    Static,
    DecisionTable,
    Dynamic,
}

/// Compile every rule file under `paths` as one batch.
///
/// Prints the diagnostics and returns `false` when compilation fails.
pub fn check(paths: &[PathBuf]) -> Result<bool> {
    let sources = collect_sources(paths)?;
    if sources.is_empty() {
        bail!("no rule files found");
    }

    match RuleCompiler::new().compile("check", 1, &sources) {
        Ok(rule_set) => {
            println!(
                "ok: {} rules compiled from {} sources",
                rule_set.len(),
                sources.len()
            );
            Ok(true)
        }
        Err(report) => {
            for diagnostic in &report.diagnostics {
                println!("{}", diagnostic);
            }
            println!("{} errors in {} sources", report.len(), report.sources().len());
            Ok(false)
        }
    }
}

pub async fn evaluate(
    input: Option<&Path>,
    tier: Option<&str>,
    target: Target,
    rules_dir: Option<PathBuf>,
) -> Result<()> {
    let text = read_input(input)?;
    let facts = parse_facts(&text)?;
    debug!(facts = facts.len(), ?target, "evaluating input");

    let engine = open_engine(rules_dir, target == Target::Dynamic).await?;
    let responses = facts
        .into_iter()
        .map(|fact| match target {
            Target::Static => engine.evaluate(fact, tier),
            Target::DecisionTable => engine.evaluate_decision_table(fact),
            Target::Dynamic => engine.evaluate_dynamic(fact),
        })
        .collect::<verdict_sdk::Result<Vec<EvaluationResponse>>>()?;

    let output = match responses.as_slice() {
        [single] => serde_json::to_string_pretty(single)?,
        all => serde_json::to_string_pretty(all)?,
    };
    println!("{}", output);
    Ok(())
}

pub async fn sources(rules_dir: Option<PathBuf>) -> Result<()> {
    let engine = open_engine(rules_dir, true).await?;
    let listing = engine.list_sources().await?;
    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(())
}

/// Build an engine without a watcher. The dynamic directory is only opened
/// when it is needed and must already exist.
async fn open_engine(rules_dir: Option<PathBuf>, dynamic: bool) -> Result<DecisionEngine> {
    let mut config = EngineConfig::load()?;
    if let Some(dir) = rules_dir {
        config = config.with_rules_dir(dir);
    }
    config.watch_interval_ms = None;

    let store: Arc<dyn SourceStore> = if dynamic {
        let store = FileSystemSourceStore::new(&config.rules_dir)
            .with_context(|| format!("opening rules directory {}", config.rules_dir.display()))?;
        Arc::new(store)
    } else {
        Arc::new(MemorySourceStore::new())
    };

    let engine = DecisionEngineBuilder::new()
        .with_config(config.load_dynamic_on_start(dynamic))
        .with_source_store(store)
        .build()
        .await?;
    info!(dynamic, "decision engine ready");
    Ok(engine)
}

/// Rule sources of the given files and directories, in path order.
///
/// Directories contribute their rule files sorted by name; other entries
/// are skipped. A file given explicitly must have a rule file extension.
fn collect_sources(paths: &[PathBuf]) -> Result<Vec<RuleSource>> {
    let mut sources = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut files = Vec::new();
            for entry in std::fs::read_dir(path)
                .with_context(|| format!("reading directory {}", path.display()))?
            {
                let entry = entry?;
                let name = entry.file_name().to_string_lossy().into_owned();
                if entry.file_type()?.is_file() && !name.starts_with('.') {
                    files.push((name, entry.path()));
                }
            }
            files.sort();
            for (name, file) in files {
                let text = std::fs::read_to_string(&file)
                    .with_context(|| format!("reading {}", file.display()))?;
                if let Some(source) = RuleSource::from_file(name, text) {
                    sources.push(source);
                }
            }
        } else {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .with_context(|| format!("not a rule file: {}", path.display()))?;
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            match RuleSource::from_file(name, text) {
                Some(source) => sources.push(source),
                None => bail!("unsupported rule file extension: {}", path.display()),
            }
        }
    }
    Ok(sources)
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("reading input {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// One fact object or an array of them
fn parse_facts(text: &str) -> Result<Vec<Fact>> {
    let value: serde_json::Value = serde_json::from_str(text).context("input is not valid JSON")?;
    let facts = match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)?,
        other => vec![serde_json::from_value(other)?],
    };
    Ok(facts)
}
