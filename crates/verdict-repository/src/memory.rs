//! In-memory source store

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::models::{validate_source_name, SourceFingerprint, SourceStamp};
use crate::{error::RepositoryError, traits::SourceStore, RepositoryResult};

#[derive(Debug, Clone)]
struct StoredSource {
    text: String,
    revision: u64,
}

/// Source store kept entirely in memory, for tests and embedded use
#[derive(Debug, Default)]
pub struct MemorySourceStore {
    sources: RwLock<BTreeMap<String, StoredSource>>,
}

impl MemorySourceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SourceStore for MemorySourceStore {
    async fn list(&self) -> RepositoryResult<Vec<String>> {
        Ok(self.sources.read().await.keys().cloned().collect())
    }

    async fn read(&self, name: &str) -> RepositoryResult<String> {
        self.sources
            .read()
            .await
            .get(name)
            .map(|source| source.text.clone())
            .ok_or_else(|| RepositoryError::SourceNotFound {
                name: name.to_string(),
            })
    }

    async fn write(&self, name: &str, content: &[u8]) -> RepositoryResult<()> {
        validate_source_name(name)?;
        let text = std::str::from_utf8(content)
            .map_err(|_| RepositoryError::InvalidEncoding {
                name: name.to_string(),
            })?
            .to_string();

        let mut sources = self.sources.write().await;
        let revision = sources.get(name).map(|s| s.revision + 1).unwrap_or(0);
        sources.insert(name.to_string(), StoredSource { text, revision });
        Ok(())
    }

    async fn remove(&self, name: &str) -> RepositoryResult<()> {
        validate_source_name(name)?;
        self.sources
            .write()
            .await
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::SourceNotFound {
                name: name.to_string(),
            })
    }

    async fn fingerprint(&self) -> RepositoryResult<SourceFingerprint> {
        let stamps = self
            .sources
            .read()
            .await
            .iter()
            .map(|(name, source)| SourceStamp {
                name: name.clone(),
                len: source.text.len() as u64,
                modified: None,
                revision: source.revision,
            })
            .collect();
        Ok(SourceFingerprint::new(stamps))
    }
}
