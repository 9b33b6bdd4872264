use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::storage::KeyValueStore;
use crate::error::{Result, RosterError};

/// Stores each key as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| RosterError::StorageWrite {
                key: dir.display().to_string(),
                source: e,
            })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RosterError::StorageRead {
                key: key.to_string(),
                source: e,
            }),
        }
    }

    /// Write to a temp file first, then rename over the old blob
    async fn set(&self, key: &str, value: String) -> Result<()> {
        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");

        tokio::fs::write(&temp_path, value.as_bytes())
            .await
            .map_err(|e| RosterError::StorageWrite {
                key: key.to_string(),
                source: e,
            })?;

        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|e| RosterError::StorageWrite {
                key: key.to_string(),
                source: e,
            })?;

        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RosterError::StorageWrite {
                key: key.to_string(),
                source: e,
            }),
        }
    }
}
