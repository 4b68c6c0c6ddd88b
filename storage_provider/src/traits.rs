//! Core storage provider trait.

use async_trait::async_trait;
use data_model::{RecordId, StorageTarget};

use crate::StorageResult;

/// Contract every backend implements.
///
/// A provider owns exactly one flat namespace (a directory, a container or a
/// table) and names every record after its identifier.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Backend label, used for logging and metrics.
    fn kind(&self) -> StorageTarget;

    /// Persist `payload` under a freshly generated identifier.
    async fn write(&self, payload: &str) -> StorageResult<RecordId>;

    /// Returns `StorageError::NotFound` if nothing is stored under `id`.
    async fn read(&self, id: &RecordId) -> StorageResult<String>;

    /// Removing an identifier that does not exist succeeds.
    async fn delete(&self, id: &RecordId) -> StorageResult<()>;

    /// Enumerate stored identifiers, skipping foreign entries.
    ///
    /// `None` or `Some(0)` means unbounded. Order is backend specific.
    async fn list(&self, limit: Option<usize>) -> StorageResult<Vec<RecordId>>;
}
