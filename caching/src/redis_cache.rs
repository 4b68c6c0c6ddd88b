use std::time::Duration;

use async_trait::async_trait;
use crate::{Cache, CacheKey, CachingError};

/// Cache backed by a redis server.
///
/// A connection is opened per operation and dropped when it completes, on
/// success and error paths alike.
pub struct RedisCache {
    client: redis::Client,
}

impl RedisCache {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    /// Does not connect; the address is only parsed.
    pub fn open(host: &str, port: u16) -> Result<Self, CachingError> {
        let client = redis::Client::open(format!("redis://{}:{}/", host, port))?;
        Ok(Self::new(client))
    }
}

impl From<redis::Client> for RedisCache {
    fn from(client: redis::Client) -> Self {
        Self::new(client)
    }
}

/// Redis rejects `EX 0`, so sub-second TTLs round up to one second.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CachingError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = redis::cmd("GET")
            .arg(key.to_string())
            .query_async(&mut conn)
            .await?;
        Ok(value)
    }

    async fn put(&self, key: &CacheKey, payload: &str, ttl: Duration) -> Result<(), CachingError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = redis::cmd("SET")
            .arg(key.to_string())
            .arg(payload)
            .arg("EX")
            .arg(ttl_secs(ttl))
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> Result<(), CachingError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = redis::cmd("UNLINK")
            .arg(key.to_string())
            .query_async(&mut conn)
            .await?;
        Ok(())
    }
}
