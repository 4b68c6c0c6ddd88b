//! Cache tier sitting in front of the storage backends.
//!
//! Entries are short-lived mirrors of recently written records; the backend
//! stays authoritative.

mod config;
mod error;
mod moka_cache;
mod noop_cache;
mod redis_cache;
mod traits;

pub use config::{build_cache, CacheBackend, CacheConfig};
pub use error::CachingError;
pub use moka_cache::MokaCache;
pub use noop_cache::NoOpCache;
pub use redis_cache::RedisCache;
pub use traits::{Cache, CacheKey};
