//! File system based source store

use async_trait::async_trait;
use path_absolutize::Absolutize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::models::{validate_source_name, SourceFingerprint, SourceStamp};
use crate::{error::RepositoryError, traits::SourceStore, RepositoryResult};

/// Rule sources stored as files in one flat directory
///
/// Subdirectories and files that are not rule sources are ignored.
#[derive(Debug, Clone)]
pub struct FileSystemSourceStore {
    /// Absolute directory path
    root_path: PathBuf,
}

impl FileSystemSourceStore {
    /// Open an existing directory
    ///
    /// # Example
    /// ```no_run
    /// use verdict_repository::FileSystemSourceStore;
    ///
    /// let store = FileSystemSourceStore::new("rules").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(root_path: P) -> RepositoryResult<Self> {
        let path = root_path.as_ref();

        if !path.is_dir() {
            return Err(RepositoryError::InvalidPath {
                path: path.to_path_buf(),
            });
        }

        let abs_path = path.absolutize()?.to_path_buf();
        Ok(Self { root_path: abs_path })
    }

    /// Open a directory, creating it first when missing
    pub async fn create<P: AsRef<Path>>(root_path: P) -> RepositoryResult<Self> {
        fs::create_dir_all(root_path.as_ref()).await?;
        Self::new(root_path)
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }

    fn source_path(&self, name: &str) -> RepositoryResult<PathBuf> {
        validate_source_name(name)?;
        Ok(self.root_path.join(name))
    }

    fn not_found(name: &str, err: std::io::Error) -> RepositoryError {
        if err.kind() == ErrorKind::NotFound {
            RepositoryError::SourceNotFound {
                name: name.to_string(),
            }
        } else {
            RepositoryError::Io(err)
        }
    }
}

#[async_trait]
impl SourceStore for FileSystemSourceStore {
    async fn list(&self) -> RepositoryResult<Vec<String>> {
        let mut entries = fs::read_dir(&self.root_path).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if validate_source_name(&name).is_ok() {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    async fn read(&self, name: &str) -> RepositoryResult<String> {
        let path = self.source_path(name)?;
        let bytes = fs::read(&path).await.map_err(|e| Self::not_found(name, e))?;
        String::from_utf8(bytes).map_err(|_| RepositoryError::InvalidEncoding {
            name: name.to_string(),
        })
    }

    async fn write(&self, name: &str, content: &[u8]) -> RepositoryResult<()> {
        let path = self.source_path(name)?;
        if std::str::from_utf8(content).is_err() {
            return Err(RepositoryError::InvalidEncoding {
                name: name.to_string(),
            });
        }

        // Write beside the target and rename so readers never see a partial file
        let staging = self.root_path.join(format!(".{}.tmp", name));
        fs::write(&staging, content).await?;
        fs::rename(&staging, &path).await?;

        debug!(source = name, bytes = content.len(), dir = %self.root_path.display(), "stored rule source");
        Ok(())
    }

    async fn remove(&self, name: &str) -> RepositoryResult<()> {
        let path = self.source_path(name)?;
        fs::remove_file(&path)
            .await
            .map_err(|e| Self::not_found(name, e))?;

        debug!(source = name, dir = %self.root_path.display(), "removed rule source");
        Ok(())
    }

    async fn fingerprint(&self) -> RepositoryResult<SourceFingerprint> {
        let mut stamps = Vec::new();
        for name in self.list().await? {
            let metadata = match fs::metadata(self.root_path.join(&name)).await {
                Ok(metadata) => metadata,
                // Deleted between listing and stat
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            stamps.push(SourceStamp {
                name,
                len: metadata.len(),
                modified: metadata.modified().ok(),
                revision: 0,
            });
        }
        Ok(SourceFingerprint::new(stamps))
    }
}
