use redis::RedisError;

#[derive(Debug, thiserror::Error)]
pub enum CachingError {
    #[error("cache encountered an IO error talking to the caching layer: {0}")]
    Io(String),

    #[error("cache encountered an error talking to redis: {source}")]
    Redis { source: RedisError },

    #[error("cache is misconfigured: {reason}")]
    Config { reason: String },
}

impl From<RedisError> for CachingError {
    fn from(e: RedisError) -> Self {
        if e.is_io_error() {
            CachingError::Io(format!("redis IO error: {}", e))
        } else {
            CachingError::Redis { source: e }
        }
    }
}
