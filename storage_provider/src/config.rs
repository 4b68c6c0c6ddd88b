//! Storage backend configuration.

use std::{env, path::PathBuf};

use data_model::StorageTarget;
use serde::{Deserialize, Serialize};

use crate::{StorageError, StorageResult};

/// Which backends are enabled in this deployment and how to reach them.
///
/// A backend whose section is absent is not served; requests addressed to it
/// fail with `BackendUnavailable`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Log and swallow delete failures instead of returning them.
    #[serde(default = "default_ignore_delete_errors")]
    pub ignore_delete_errors: bool,

    #[serde(default)]
    pub file: Option<FileConfig>,

    #[serde(default)]
    pub blob: Option<BlobConfig>,

    #[serde(default)]
    pub table: Option<TableConfig>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            ignore_delete_errors: default_ignore_delete_errors(),
            file: Some(FileConfig::default()),
            blob: None,
            table: None,
        }
    }
}

fn default_ignore_delete_errors() -> bool {
    true
}

impl StorageConfig {
    pub fn targets(&self) -> Vec<StorageTarget> {
        let mut targets = Vec::new();
        if self.file.is_some() {
            targets.push(StorageTarget::File);
        }
        if self.blob.is_some() {
            targets.push(StorageTarget::Blob);
        }
        if self.table.is_some() {
            targets.push(StorageTarget::Table);
        }
        targets
    }

    pub fn validate(&self) -> StorageResult<()> {
        if let Some(file) = &self.file {
            file.validate()?;
        }
        if let Some(blob) = &self.blob {
            blob.validate()?;
        }
        if let Some(table) = &self.table {
            table.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    /// Existing directory records are written into.
    pub root: PathBuf,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            root: env::temp_dir(),
        }
    }
}

impl FileConfig {
    pub fn validate(&self) -> StorageResult<()> {
        if self.root.as_os_str().is_empty() {
            return Err(StorageError::unconfigured(
                StorageTarget::File,
                "file root directory is not set",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobConfig {
    /// Azure storage connection string, or `memory://` for an in-process
    /// store.
    pub connection: String,

    pub container: String,
}

impl BlobConfig {
    pub fn validate(&self) -> StorageResult<()> {
        if self.connection.trim().is_empty() {
            return Err(StorageError::unconfigured(
                StorageTarget::Blob,
                "blob connection string is not set",
            ));
        }
        if self.container.trim().is_empty() {
            return Err(StorageError::unconfigured(
                StorageTarget::Blob,
                "blob container name is not set",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// Cloud region, or `memory` for an in-process table.
    pub region: String,

    pub table: String,
}

impl TableConfig {
    pub fn validate(&self) -> StorageResult<()> {
        if self.region.trim().is_empty() {
            return Err(StorageError::unconfigured(
                StorageTarget::Table,
                "table region is not set",
            ));
        }
        if self.table.trim().is_empty() {
            return Err(StorageError::unconfigured(
                StorageTarget::Table,
                "table name is not set",
            ));
        }
        Ok(())
    }
}
