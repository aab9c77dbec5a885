//! Cache port for serialized task snapshots.

use async_trait::async_trait;
use std::time::Duration;

/// Key/value store with per-entry expiry, backed by Redis or process memory.
///
/// Callers treat every error as a miss; the cache is never the source of
/// truth.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Fetch a live entry. Expired entries read as `None`.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key` for `ttl`, replacing any previous entry.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Drop a key. Missing keys are not an error.
    async fn invalidate(&self, key: &str) -> Result<(), CacheError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("Cache command failed: {0}")]
    Command(String),
}
