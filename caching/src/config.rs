use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Cache, CachingError, MokaCache, NoOpCache, RedisCache};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Redis,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub backend: CacheBackend,
    pub host: String,
    pub port: u16,
    /// Lifetime of every cache entry.
    pub ttl_secs: u64,
    /// Entry bound for the memory backend.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            backend: CacheBackend::Redis,
            host: "localhost".to_string(),
            port: 6379,
            ttl_secs: 2,
            max_capacity: 10_000,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn validate(&self) -> Result<(), CachingError> {
        if !self.enabled {
            return Ok(());
        }
        if self.ttl_secs == 0 {
            return Err(CachingError::Config {
                reason: "ttl_secs must be greater than 0".to_string(),
            });
        }
        if self.backend == CacheBackend::Redis {
            if self.host.trim().is_empty() {
                return Err(CachingError::Config {
                    reason: "redis host is not set".to_string(),
                });
            }
            if self.port == 0 {
                return Err(CachingError::Config {
                    reason: "redis port is not set".to_string(),
                });
            }
        }
        Ok(())
    }
}

pub fn build_cache(config: &CacheConfig) -> Result<Arc<dyn Cache>, CachingError> {
    config.validate()?;
    if !config.enabled {
        info!("caching disabled, using NoOpCache");
        return Ok(Arc::new(NoOpCache::new()));
    }
    match config.backend {
        CacheBackend::Memory => {
            info!(max_capacity = config.max_capacity, "using in-memory cache");
            Ok(Arc::new(MokaCache::new(config.max_capacity)))
        }
        CacheBackend::Redis => {
            info!(host = %config.host, port = config.port, "using redis cache");
            Ok(Arc::new(RedisCache::open(&config.host, config.port)?))
        }
    }
}
