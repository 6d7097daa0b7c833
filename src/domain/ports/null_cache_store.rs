//! Null cache store implementation.
//!
//! Used when caching is switched off at the wiring level but the type
//! system still requires a `CacheStore`.

use async_trait::async_trait;
use std::time::Duration;

use super::CacheStore;
use crate::domain::errors::CacheResult;

/// A no-op store that remembers nothing.
///
/// Every lookup misses and every write is discarded, so the orchestrator
/// computes on every call.
#[derive(Debug, Clone, Default)]
pub struct NullCacheStore;

impl NullCacheStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheStore for NullCacheStore {
    async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> CacheResult<()> {
        Ok(())
    }

    async fn delete_prefix(&self, _prefix: &str) -> CacheResult<u64> {
        Ok(0)
    }

    fn name(&self) -> &'static str {
        "null"
    }
}
