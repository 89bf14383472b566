//! Verdict command line
//!
//! Compile-checks rule files, evaluates transactions read from JSON and
//! lists the dynamic rule sources of a directory.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "verdict", version, about = "Tiered rule engine for transaction decisions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile rule files and report every diagnostic
    Check {
        /// Rule files or directories of rule files
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Evaluate one transaction or a JSON array of transactions
    Evaluate {
        /// JSON input file; reads stdin when omitted or `-`
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// LOW, MEDIUM, HIGH or ALL
        #[arg(short, long)]
        tier: Option<String>,

        /// Rule set to evaluate against
        #[arg(long, value_enum, default_value_t = commands::Target::Static)]
        rule_set: commands::Target,

        /// Directory holding the dynamic rule files
        #[arg(long)]
        rules_dir: Option<PathBuf>,
    },

    /// List the dynamic rule sources and the active version
    Sources {
        #[arg(long)]
        rules_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    match cli.command {
        Command::Check { paths } => {
            let ok = commands::check(&paths)?;
            if !ok {
                std::process::exit(1);
            }
        }
        Command::Evaluate {
            input,
            tier,
            rule_set,
            rules_dir,
        } => commands::evaluate(input.as_deref(), tier.as_deref(), rule_set, rules_dir).await?,
        Command::Sources { rules_dir } => commands::sources(rules_dir).await?,
    }

    Ok(())
}

/// Log levels used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "verdict=info,verdict_sdk=info,verdict_runtime=info";

/// Initialize tracing subscriber
fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_covers_binary() {
        let own = format!("{}=info", env!("CARGO_CRATE_NAME"));
        assert!(DEFAULT_LOG_FILTER.split(',').any(|directive| directive == own));
        assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }
}
