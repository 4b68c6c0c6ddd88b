use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use anyhow::anyhow;
use async_trait::async_trait;
use caching::{Cache, CacheKey, CachingError};
use data_model::{RecordId, StorageTarget};
use object_store::memory::InMemory;
use storage_provider::{
    BlobProvider,
    FileConfig,
    FileProvider,
    InMemoryTable,
    Providers,
    StorageError,
    StorageProvider,
    StorageResult,
    TableProvider,
};
use tempfile::TempDir;

use crate::facade::StorageFacade;

/// One provider per target, all in process. The file backend lives in a
/// temporary directory that is removed when this is dropped.
pub struct TestBackends {
    _temp_dir: TempDir,
    file: Arc<FileProvider>,
    blob: Arc<BlobProvider>,
    table: Arc<TableProvider>,
}

impl TestBackends {
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = FileProvider::new(&FileConfig {
            root: temp_dir.path().to_path_buf(),
        })
        .await
        .unwrap();
        Self {
            _temp_dir: temp_dir,
            file: Arc::new(file),
            blob: Arc::new(BlobProvider::from_object_store(
                Arc::new(InMemory::new()),
                "test-container",
            )),
            table: Arc::new(TableProvider::new(
                Arc::new(InMemoryTable::new()),
                "test-table",
            )),
        }
    }

    pub fn file_provider(&self) -> Arc<dyn StorageProvider> {
        self.file.clone()
    }

    pub fn providers(&self) -> Providers {
        let mut providers: Providers = HashMap::new();
        providers.insert(StorageTarget::File, self.file.clone());
        providers.insert(StorageTarget::Blob, self.blob.clone());
        providers.insert(StorageTarget::Table, self.table.clone());
        providers
    }

    pub fn facade(&self, cache: Arc<dyn Cache>, ignore_delete_errors: bool) -> StorageFacade {
        StorageFacade::new(
            self.providers(),
            cache,
            Duration::from_secs(2),
            ignore_delete_errors,
        )
    }
}

/// Facade serving only the file target through `provider`.
pub fn facade_with_cache(
    provider: Arc<dyn StorageProvider>,
    cache: Arc<dyn Cache>,
    ttl: Duration,
) -> StorageFacade {
    let mut providers: Providers = HashMap::new();
    providers.insert(StorageTarget::File, provider);
    StorageFacade::new(providers, cache, ttl, true)
}

/// Wraps a provider and fails every call while marked unreachable.
pub struct SwitchableProvider {
    inner: Arc<dyn StorageProvider>,
    reachable: AtomicBool,
}

impl SwitchableProvider {
    pub fn new(inner: Arc<dyn StorageProvider>) -> Self {
        Self {
            inner,
            reachable: AtomicBool::new(true),
        }
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    fn check(&self) -> StorageResult<()> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::unavailable(
                self.inner.kind(),
                anyhow!("connection refused"),
            ))
        }
    }
}

#[async_trait]
impl StorageProvider for SwitchableProvider {
    fn kind(&self) -> StorageTarget {
        self.inner.kind()
    }

    async fn write(&self, payload: &str) -> StorageResult<RecordId> {
        self.check()?;
        self.inner.write(payload).await
    }

    async fn read(&self, id: &RecordId) -> StorageResult<String> {
        self.check()?;
        self.inner.read(id).await
    }

    async fn delete(&self, id: &RecordId) -> StorageResult<()> {
        self.check()?;
        self.inner.delete(id).await
    }

    async fn list(&self, limit: Option<usize>) -> StorageResult<Vec<RecordId>> {
        self.check()?;
        self.inner.list(limit).await
    }
}

/// Cache whose every call fails as if the cache server were down.
pub struct FailingCache;

#[async_trait]
impl Cache for FailingCache {
    async fn get(&self, _key: &CacheKey) -> Result<Option<String>, CachingError> {
        Err(CachingError::Io("connection refused".to_string()))
    }

    async fn put(&self, _key: &CacheKey, _payload: &str, _ttl: Duration) -> Result<(), CachingError> {
        Err(CachingError::Io("connection refused".to_string()))
    }

    async fn remove(&self, _key: &CacheKey) -> Result<(), CachingError> {
        Err(CachingError::Io("connection refused".to_string()))
    }
}
