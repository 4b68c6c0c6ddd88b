use std::{collections::HashMap, sync::Arc, time::Duration};

use caching::{Cache, CacheKey};
use data_model::{RecordId, StorageTarget};
use storage_provider::{
    Providers,
    StorageError,
    StorageMetrics,
    StorageProvider,
    StorageResult,
};
use tracing::{debug, info, instrument, warn};

/// Routes each call to exactly one backend and keeps the cache tier in step
/// with it.
///
/// The cache only ever short-circuits reads, and only for entries mirrored
/// from the same target. Writes go to the backend first and are mirrored
/// afterwards; deletes purge the mirror once the backend has been asked to
/// drop the record. Cache failures are logged and never fail the call.
pub struct StorageFacade {
    providers: HashMap<StorageTarget, Arc<dyn StorageProvider>>,
    cache: Arc<dyn Cache>,
    cache_ttl: Duration,
    ignore_delete_errors: bool,
    metrics: StorageMetrics,
}

impl StorageFacade {
    pub fn new(
        providers: Providers,
        cache: Arc<dyn Cache>,
        cache_ttl: Duration,
        ignore_delete_errors: bool,
    ) -> Self {
        info!(
            targets = ?providers.keys().collect::<Vec<_>>(),
            cache_enabled = cache.is_enabled(),
            ignore_delete_errors,
            "storage facade ready"
        );
        Self {
            providers,
            cache,
            cache_ttl,
            ignore_delete_errors,
            metrics: StorageMetrics::from_global(),
        }
    }

    /// Targets served by this deployment, in a stable order.
    pub fn targets(&self) -> Vec<StorageTarget> {
        let mut targets: Vec<StorageTarget> = self.providers.keys().copied().collect();
        targets.sort();
        targets
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.is_enabled()
    }

    fn resolve(&self, target: &str) -> StorageResult<(StorageTarget, &Arc<dyn StorageProvider>)> {
        let parsed: StorageTarget =
            target
                .parse()
                .map_err(|_| StorageError::UnsupportedTarget {
                    target: target.to_string(),
                })?;
        let provider = self
            .providers
            .get(&parsed)
            .ok_or_else(|| StorageError::unconfigured(parsed, "backend is not configured"))?;
        Ok((parsed, provider))
    }

    fn observe<T>(
        &self,
        operation: &'static str,
        target: Option<StorageTarget>,
        result: StorageResult<T>,
    ) -> StorageResult<T> {
        if let Err(err) = &result {
            self.metrics.record_error(operation, target, err.kind());
        }
        result
    }

    #[instrument(skip(self, payload), fields(payload_len = payload.len()))]
    pub async fn write(&self, target: &str, payload: String) -> StorageResult<RecordId> {
        let label = metric_target(target);
        let _timer = self.metrics.timer("write", label);
        let result = self.write_inner(target, &payload).await;
        self.observe("write", label, result)
    }

    async fn write_inner(&self, target: &str, payload: &str) -> StorageResult<RecordId> {
        let (target, provider) = self.resolve(target)?;
        let id = provider.write(payload).await?;
        debug!(%id, "record written");
        self.mirror(&CacheKey::new(target, id), payload).await;
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn read(&self, target: &str, id: &str) -> StorageResult<String> {
        let label = metric_target(target);
        let _timer = self.metrics.timer("read", label);
        let result = self.read_inner(target, id).await;
        self.observe("read", label, result)
    }

    async fn read_inner(&self, target: &str, id: &str) -> StorageResult<String> {
        let (target, provider) = self.resolve(target)?;
        let id: RecordId = id.parse()?;
        let key = CacheKey::new(target, id);

        match self.cache.get(&key).await {
            Ok(Some(payload)) => {
                debug!(%key, "cache hit");
                return Ok(payload);
            }
            Ok(None) => {}
            Err(err) => warn!(%key, "cache lookup failed, reading from backend: {}", err),
        }

        let payload = provider.read(&id).await?;
        self.mirror(&key, &payload).await;
        Ok(payload)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, target: &str, id: &str) -> StorageResult<()> {
        let label = metric_target(target);
        let _timer = self.metrics.timer("delete", label);
        let result = self.delete_inner(target, id).await;
        let result = self.observe("delete", label, result);
        match result {
            Err(err) if self.ignore_delete_errors && !err.is_caller_error() => {
                warn!("delete failed, reporting success: {}", err);
                Ok(())
            }
            result => result,
        }
    }

    async fn delete_inner(&self, target: &str, id: &str) -> StorageResult<()> {
        let (target, provider) = self.resolve(target)?;
        let id: RecordId = id.parse()?;
        provider.delete(&id).await?;
        let key = CacheKey::new(target, id);
        if let Err(err) = self.cache.remove(&key).await {
            warn!(%key, "failed to purge cache entry: {}", err);
        }
        debug!(%id, "record deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list(&self, target: &str, limit: Option<usize>) -> StorageResult<Vec<RecordId>> {
        let label = metric_target(target);
        let _timer = self.metrics.timer("list", label);
        let result = match self.resolve(target) {
            Ok((_, provider)) => provider.list(limit).await,
            Err(err) => Err(err),
        };
        self.observe("list", label, result)
    }

    async fn mirror(&self, key: &CacheKey, payload: &str) {
        if let Err(err) = self.cache.put(key, payload, self.cache_ttl).await {
            warn!(%key, "failed to populate cache: {}", err);
        }
    }
}

/// Caller supplied labels never reach metric attributes unparsed.
fn metric_target(target: &str) -> Option<StorageTarget> {
    target.parse().ok()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use caching::{MokaCache, NoOpCache};
    use strum::IntoEnumIterator;

    use super::*;
    use crate::testing::{facade_with_cache, FailingCache, SwitchableProvider, TestBackends};

    #[tokio::test]
    async fn test_round_trip_every_target() {
        let backends = TestBackends::new().await;
        let facade = backends.facade(Arc::new(NoOpCache::new()), true);

        for target in StorageTarget::iter() {
            let id = facade
                .write(target.as_ref(), format!("payload for {}", target))
                .await
                .unwrap();
            let payload = facade.read(target.as_ref(), &id.to_string()).await.unwrap();
            assert_eq!(payload, format!("payload for {}", target));
        }
    }

    #[tokio::test]
    async fn test_target_label_is_case_insensitive() {
        let backends = TestBackends::new().await;
        let facade = backends.facade(Arc::new(NoOpCache::new()), true);

        let id = facade.write("FILE", "hello".to_string()).await.unwrap();
        assert_eq!(facade.read("file", &id.to_string()).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_unwritten_id_is_not_found() {
        let backends = TestBackends::new().await;
        let facade = backends.facade(Arc::new(MokaCache::new(100)), true);

        for target in StorageTarget::iter() {
            let err = facade
                .read(target.as_ref(), &RecordId::new().to_string())
                .await
                .unwrap_err();
            assert!(err.is_not_found(), "{}: {}", target, err);
        }
    }

    #[tokio::test]
    async fn test_unknown_target_is_rejected_everywhere() {
        let backends = TestBackends::new().await;
        // caller errors surface even when backend delete failures are ignored
        let facade = backends.facade(Arc::new(NoOpCache::new()), true);
        let id = RecordId::new().to_string();

        let is_unsupported =
            |err: StorageError| matches!(err, StorageError::UnsupportedTarget { target } if target == "ftp");

        assert!(is_unsupported(facade.write("ftp", "x".to_string()).await.unwrap_err()));
        assert!(is_unsupported(facade.read("ftp", &id).await.unwrap_err()));
        assert!(is_unsupported(facade.delete("ftp", &id).await.unwrap_err()));
        assert!(is_unsupported(facade.list("ftp", None).await.unwrap_err()));
    }

    #[tokio::test]
    async fn test_malformed_id_is_a_validation_error() {
        let backends = TestBackends::new().await;
        let facade = backends.facade(Arc::new(NoOpCache::new()), false);

        let err = facade.read("file", "../etc/passwd").await.unwrap_err();
        assert!(matches!(err, StorageError::Validation { .. }));
        let err = facade.delete("file", "not-an-id").await.unwrap_err();
        assert!(matches!(err, StorageError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_unconfigured_target_is_unavailable() {
        let backends = TestBackends::new().await;
        let mut providers = backends.providers();
        providers.remove(&StorageTarget::Table);
        let facade = StorageFacade::new(
            providers,
            Arc::new(NoOpCache::new()),
            Duration::from_secs(2),
            true,
        );

        assert_eq!(facade.targets(), vec![StorageTarget::File, StorageTarget::Blob]);
        let err = facade.write("table", "x".to_string()).await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::BackendUnavailable {
                backend: StorageTarget::Table,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let backends = TestBackends::new().await;
        let facade = backends.facade(Arc::new(MokaCache::new(100)), false);

        for target in StorageTarget::iter() {
            let id = facade.write(target.as_ref(), "bye".to_string()).await.unwrap();
            let id = id.to_string();
            facade.delete(target.as_ref(), &id).await.unwrap();
            facade.delete(target.as_ref(), &id).await.unwrap();
            assert!(facade.read(target.as_ref(), &id).await.unwrap_err().is_not_found());
        }
    }

    #[tokio::test]
    async fn test_delete_purges_cache() {
        let backends = TestBackends::new().await;
        let cache = Arc::new(MokaCache::new(100));
        let facade = backends.facade(cache.clone(), false);

        let id = facade.write("blob", "cached".to_string()).await.unwrap();
        let key = CacheKey::new(StorageTarget::Blob, id);
        assert!(cache.get(&key).await.unwrap().is_some());

        facade.delete("blob", &id.to_string()).await.unwrap();
        assert!(cache.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_respects_limit() {
        let backends = TestBackends::new().await;
        let facade = backends.facade(Arc::new(NoOpCache::new()), true);

        for target in StorageTarget::iter() {
            let mut written = Vec::new();
            for i in 0..5 {
                written.push(facade.write(target.as_ref(), i.to_string()).await.unwrap());
            }
            let listed = facade.list(target.as_ref(), Some(3)).await.unwrap();
            assert_eq!(listed.len(), 3);
            assert!(listed.iter().all(|id| written.contains(id)));
            assert_eq!(facade.list(target.as_ref(), None).await.unwrap().len(), 5);
        }
    }

    #[tokio::test]
    async fn test_file_scenario() {
        let backends = TestBackends::new().await;
        let facade = backends.facade(Arc::new(NoOpCache::new()), true);

        let k1 = facade.write("file", "hello".to_string()).await.unwrap().to_string();
        assert_eq!(facade.read("file", &k1).await.unwrap(), "hello");
        facade.delete("file", &k1).await.unwrap();
        assert!(facade.read("file", &k1).await.unwrap_err().is_not_found());

        let listed = facade.list("file", Some(10)).await.unwrap();
        assert!(!listed.iter().any(|id| id.to_string() == k1));
    }

    #[tokio::test]
    async fn test_cache_serves_reads_while_backend_is_down() {
        let backends = TestBackends::new().await;
        let switchable = Arc::new(SwitchableProvider::new(backends.file_provider()));
        let facade = facade_with_cache(
            switchable.clone(),
            Arc::new(MokaCache::new(100)),
            Duration::from_millis(300),
        );

        let id = facade.write("file", "hello".to_string()).await.unwrap().to_string();
        switchable.set_reachable(false);
        assert_eq!(facade.read("file", &id).await.unwrap(), "hello");

        // once the entry expires the read falls through to the backend
        tokio::time::sleep(Duration::from_millis(600)).await;
        let err = facade.read("file", &id).await.unwrap_err();
        assert!(matches!(err, StorageError::BackendUnavailable { .. }));

        switchable.set_reachable(true);
        assert_eq!(facade.read("file", &id).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_delete_errors_follow_configuration() {
        let backends = TestBackends::new().await;
        let switchable = Arc::new(SwitchableProvider::new(backends.file_provider()));
        let mut providers: Providers = HashMap::new();
        providers.insert(StorageTarget::File, switchable.clone());

        let strict = StorageFacade::new(
            providers.clone(),
            Arc::new(NoOpCache::new()),
            Duration::from_secs(2),
            false,
        );
        let lenient = StorageFacade::new(
            providers,
            Arc::new(NoOpCache::new()),
            Duration::from_secs(2),
            true,
        );

        let id = strict.write("file", "x".to_string()).await.unwrap().to_string();
        switchable.set_reachable(false);
        assert!(strict.delete("file", &id).await.is_err());
        assert!(lenient.delete("file", &id).await.is_ok());
        assert!(lenient.delete("file", "not-an-id").await.is_err());
    }

    #[tokio::test]
    async fn test_read_repopulates_cache() {
        let backends = TestBackends::new().await;
        let cache = Arc::new(MokaCache::new(100));
        let facade = backends.facade(cache.clone(), true);

        let id = facade.write("table", "warm".to_string()).await.unwrap();
        let key = CacheKey::new(StorageTarget::Table, id);
        cache.remove(&key).await.unwrap();

        assert_eq!(facade.read("table", &id.to_string()).await.unwrap(), "warm");
        assert_eq!(cache.get(&key).await.unwrap().as_deref(), Some("warm"));
    }

    #[tokio::test]
    async fn test_cached_record_is_not_served_for_another_target() {
        let backends = TestBackends::new().await;
        let facade = backends.facade(Arc::new(MokaCache::new(100)), true);

        let id = facade.write("blob", "blob-only".to_string()).await.unwrap();
        let id = id.to_string();

        let err = facade.read("file", &id).await.unwrap_err();
        assert!(err.is_not_found(), "{}", err);
        let err = facade.read("table", &id).await.unwrap_err();
        assert!(err.is_not_found(), "{}", err);
        assert_eq!(facade.read("blob", &id).await.unwrap(), "blob-only");

        // deleting under another target leaves the blob mirror alone
        facade.delete("file", &id).await.unwrap();
        assert_eq!(facade.read("blob", &id).await.unwrap(), "blob-only");
    }

    #[tokio::test]
    async fn test_cache_failures_never_fail_operations() {
        let backends = TestBackends::new().await;
        let facade = backends.facade(Arc::new(FailingCache), false);

        for target in StorageTarget::iter() {
            let id = facade
                .write(target.as_ref(), "still stored".to_string())
                .await
                .unwrap()
                .to_string();
            assert_eq!(facade.read(target.as_ref(), &id).await.unwrap(), "still stored");
            facade.delete(target.as_ref(), &id).await.unwrap();
            assert!(facade.read(target.as_ref(), &id).await.unwrap_err().is_not_found());
        }
    }

    #[test]
    fn test_metric_target_only_accepts_known_labels() {
        assert_eq!(metric_target("FILE"), Some(StorageTarget::File));
        assert_eq!(metric_target("ftp"), None);
        assert_eq!(metric_target(""), None);
    }
}
