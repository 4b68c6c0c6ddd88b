//! Local filesystem backend: one file per record in a fixed directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use data_model::{RecordId, StorageTarget};
use tracing::debug;

use crate::{listing::IdCollector, FileConfig, StorageError, StorageProvider, StorageResult};

pub struct FileProvider {
    root: PathBuf,
}

impl FileProvider {
    /// The root directory must already exist; it is never created here.
    pub async fn new(config: &FileConfig) -> StorageResult<Self> {
        config.validate()?;
        let metadata = tokio::fs::metadata(&config.root).await.map_err(|e| {
            StorageError::unconfigured(
                StorageTarget::File,
                format!("root directory {}: {}", config.root.display(), e),
            )
        })?;
        if !metadata.is_dir() {
            return Err(StorageError::unconfigured(
                StorageTarget::File,
                format!("root {} is not a directory", config.root.display()),
            ));
        }
        debug!(root = %config.root.display(), "created file storage provider");
        Ok(Self {
            root: config.root.clone(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: &RecordId) -> PathBuf {
        self.root.join(id.to_string())
    }

    fn staging_path(&self, id: &RecordId) -> PathBuf {
        self.root.join(format!(".{}.tmp", id))
    }

    fn unavailable(e: std::io::Error) -> StorageError {
        StorageError::unavailable(StorageTarget::File, e)
    }
}

#[async_trait]
impl StorageProvider for FileProvider {
    fn kind(&self) -> StorageTarget {
        StorageTarget::File
    }

    async fn write(&self, payload: &str) -> StorageResult<RecordId> {
        let id = RecordId::new();
        let staging = self.staging_path(&id);
        tokio::fs::write(&staging, payload.as_bytes())
            .await
            .map_err(Self::unavailable)?;
        if let Err(e) = tokio::fs::rename(&staging, self.record_path(&id)).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(Self::unavailable(e));
        }
        Ok(id)
    }

    async fn read(&self, id: &RecordId) -> StorageResult<String> {
        tokio::fs::read_to_string(self.record_path(id))
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    StorageError::NotFound { id: *id }
                } else {
                    Self::unavailable(e)
                }
            })
    }

    async fn delete(&self, id: &RecordId) -> StorageResult<()> {
        match tokio::fs::remove_file(self.record_path(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::unavailable(e)),
        }
    }

    async fn list(&self, limit: Option<usize>) -> StorageResult<Vec<RecordId>> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(Self::unavailable)?;
        let mut collector = IdCollector::new(limit);
        while let Some(entry) = entries.next_entry().await.map_err(Self::unavailable)? {
            if collector.is_full() {
                break;
            }
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                collector.offer(name);
            }
        }
        Ok(collector.into_ids())
    }
}
