use std::time::Duration;

use async_trait::async_trait;

use crate::{Cache, CacheKey, CachingError};

/// Used when caching is disabled: every lookup misses.
#[derive(Default)]
pub struct NoOpCache;

impl NoOpCache {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Cache for NoOpCache {
    async fn get(&self, _key: &CacheKey) -> Result<Option<String>, CachingError> {
        Ok(None)
    }

    async fn put(&self, _key: &CacheKey, _payload: &str, _ttl: Duration) -> Result<(), CachingError> {
        Ok(())
    }

    async fn remove(&self, _key: &CacheKey) -> Result<(), CachingError> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
