//! Common test utilities for integration tests
//!
//! Provides shared fixtures, stores with scripted failures and a compute
//! function that counts its invocations.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use agent_response_cache::{AgentResponse, CacheError, CacheResult, CacheStore, MemoryCacheStore};

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
///
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Stand-in for an agent invocation that counts how often it runs.
#[derive(Clone, Default)]
pub struct CountingAgent {
    calls: Arc<AtomicUsize>,
}

impl CountingAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Answer with `text`, recording the call.
    pub async fn respond(&self, text: &str) -> Result<AgentResponse, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AgentResponse::new(text))
    }

    /// Fail with `message`, recording the call.
    pub async fn fail(&self, message: &str) -> Result<AgentResponse, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(message.to_string())
    }
}

/// Store whose every operation fails as if the backend were down.
#[derive(Default)]
pub struct UnavailableStore {
    pub attempts: AtomicUsize,
}

#[async_trait]
impl CacheStore for UnavailableStore {
    async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::StoreUnavailable("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> CacheResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::StoreUnavailable("connection refused".to_string()))
    }

    async fn delete_prefix(&self, _prefix: &str) -> CacheResult<u64> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::StoreUnavailable("connection refused".to_string()))
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}

/// Store that reads fine but whose writes always fail.
#[derive(Default)]
pub struct ReadOnlyStore {
    inner: MemoryCacheStore,
}

#[async_trait]
impl CacheStore for ReadOnlyStore {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> CacheResult<()> {
        Err(CacheError::StoreUnavailable("READONLY replica".to_string()))
    }

    async fn delete_prefix(&self, prefix: &str) -> CacheResult<u64> {
        self.inner.delete_prefix(prefix).await
    }

    fn name(&self) -> &'static str {
        "read-only"
    }
}

/// Overwrite every stored value with bytes that are not a valid envelope.
pub async fn corrupt_all(store: &MemoryCacheStore, keys: &[&str]) {
    for key in keys {
        store
            .set(key, b"\x00not-json", Duration::from_secs(60))
            .await
            .expect("memory store accepts writes");
    }
}
