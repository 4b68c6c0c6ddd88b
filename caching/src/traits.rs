use std::{
    fmt::{self, Display},
    time::Duration,
};

use async_trait::async_trait;
use data_model::{RecordId, StorageTarget};

use crate::CachingError;

/// Cache entries are scoped to the backend the record lives in, so a mirror
/// of one target never answers a read addressed to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub target: StorageTarget,
    pub id: RecordId,
}

impl CacheKey {
    pub fn new(target: StorageTarget, id: RecordId) -> Self {
        Self { target, id }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.target, self.id)
    }
}

/// Short-lived side store mirroring recently written or read records.
///
/// A miss (`Ok(None)`) only means the caller has to ask the backend; it says
/// nothing about whether the record exists.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CachingError>;

    /// Stores `payload` for at most `ttl`.
    async fn put(&self, key: &CacheKey, payload: &str, ttl: Duration) -> Result<(), CachingError>;

    async fn remove(&self, key: &CacheKey) -> Result<(), CachingError>;

    /// False for the no-op cache.
    fn is_enabled(&self) -> bool {
        true
    }
}
