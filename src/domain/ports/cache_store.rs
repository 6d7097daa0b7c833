use async_trait::async_trait;
use std::time::Duration;

use crate::domain::errors::CacheResult;

/// Port trait for the shared key-value store holding cached responses
///
/// Implementations must be safe for concurrent use by many callers without
/// external locking, and every operation must be bounded by a timeout so an
/// unreachable store cannot stall a request.
///
/// Transport failures (connection refused, timeout, authentication) are
/// reported as [`CacheError::StoreUnavailable`](crate::domain::CacheError::StoreUnavailable).
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch the raw value stored under `key`
    ///
    /// Returns `None` if the key is absent or has expired.
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Store `value` under `key`, expiring after `ttl`
    ///
    /// A zero TTL is rejected with `InvalidConfiguration`; entries without
    /// expiry are never written. Overwrites any existing value.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()>;

    /// Delete every key starting with `prefix`
    ///
    /// # Returns
    /// Number of keys removed
    async fn delete_prefix(&self, prefix: &str) -> CacheResult<u64>;

    /// Backend name used in log fields.
    fn name(&self) -> &'static str;
}
