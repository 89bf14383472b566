//! Rule source storage
//!
//! A [`SourceStore`] holds rule-source files keyed by bare file name. The
//! hot-reload path reads a whole store, compiles it and publishes the
//! result; uploads and deletions go through the same store.

use async_trait::async_trait;
use tracing::debug;
use verdict_core::RuleSource;

use crate::models::{validate_source_name, SourceFingerprint};
use crate::RepositoryResult;

/// Storage backend for rule-source files
///
/// All implementations must be `Send + Sync` for use across async tasks.
#[async_trait]
pub trait SourceStore: Send + Sync {
    /// Names of every stored rule source, sorted. Files of unknown formats
    /// are not listed.
    async fn list(&self) -> RepositoryResult<Vec<String>>;

    /// Raw text of one source
    async fn read(&self, name: &str) -> RepositoryResult<String>;

    /// Create or overwrite a source
    async fn write(&self, name: &str, content: &[u8]) -> RepositoryResult<()>;

    /// Delete a source; `SourceNotFound` when absent
    async fn remove(&self, name: &str) -> RepositoryResult<()>;

    /// Change-detection stamps for every listed source
    async fn fingerprint(&self) -> RepositoryResult<SourceFingerprint>;

    /// Read every source, classified by its file extension, in name order
    async fn load_all(&self) -> RepositoryResult<Vec<RuleSource>> {
        let names = self.list().await?;
        let mut sources = Vec::with_capacity(names.len());

        for name in names {
            let format = validate_source_name(&name)?;
            let text = self.read(&name).await?;
            debug!(source = %name, %format, bytes = text.len(), "loaded rule source");
            sources.push(RuleSource::new(name, text, format));
        }

        Ok(sources)
    }
}
