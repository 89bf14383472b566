//! Repository layer for the verdict rule engine
//!
//! This crate owns two kinds of state:
//!
//! - **Published rule sets**: [`RuleRepository`] maps a name such as
//!   `static` or `dynamic` to the active compiled [`RuleSet`], swapped
//!   atomically on publish
//! - **Rule sources**: [`SourceStore`] implementations hold the rule files a
//!   dynamic set is compiled from, on disk or in memory
//!
//! # Quick Start
//!
//! ```no_run
//! use verdict_repository::{FileSystemSourceStore, RuleRepository, SourceStore};
//! use verdict_core::RuleSet;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = FileSystemSourceStore::create("rules").await?;
//!     store.write("limits.rules", b"rule \"x\"\nwhen\namount > 1\nthen\nstatus = \"REVIEW\"\nend\n").await?;
//!     let sources = store.load_all().await?;
//!     println!("{} rule sources", sources.len());
//!
//!     let repo = RuleRepository::new();
//!     repo.publish("dynamic", RuleSet::empty("dynamic", 1));
//!     assert!(repo.get("dynamic").is_some());
//!     Ok(())
//! }
//! ```
//!
//! [`RuleSet`]: verdict_core::RuleSet

pub mod error;
pub mod file_system;
pub mod memory;
pub mod models;
pub mod rule_repository;
pub mod traits;

pub use error::{RepositoryError, RepositoryResult};
pub use file_system::FileSystemSourceStore;
pub use memory::MemorySourceStore;
pub use models::{validate_source_name, PublishedRuleSet, SourceFingerprint, SourceStamp};
pub use rule_repository::RuleRepository;
pub use traits::SourceStore;
