use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;

use crate::{Cache, CacheKey, CachingError};

#[derive(Clone)]
struct Entry {
    payload: String,
    ttl: Duration,
}

/// Expires every entry after the ttl it was inserted with.
struct PerEntryTtl;

impl Expiry<CacheKey, Entry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        value: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &CacheKey,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process cache for single node deployments.
pub struct MokaCache {
    cache: moka::future::Cache<CacheKey, Entry>,
}

impl MokaCache {
    pub fn new(max_capacity: u64) -> Self {
        let cache = moka::future::Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();
        Self { cache }
    }
}

impl Default for MokaCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl Cache for MokaCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CachingError> {
        Ok(self.cache.get(key).await.map(|entry| entry.payload))
    }

    async fn put(&self, key: &CacheKey, payload: &str, ttl: Duration) -> Result<(), CachingError> {
        self.cache
            .insert(
                *key,
                Entry {
                    payload: payload.to_string(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> Result<(), CachingError> {
        self.cache.invalidate(key).await;
        Ok(())
    }
}
