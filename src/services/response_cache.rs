//! Cache orchestrator for AI-agent invocations.
//!
//! [`ResponseCache::get_or_compute`] returns a stored answer for an
//! equivalent request when one exists, and otherwise runs the caller's
//! compute future and stores its successful result.
//!
//! The cache is fail-open: key derivation failures, store outages and
//! undecodable entries all degrade to computing directly. Only the compute
//! future's own error ever reaches the caller, and it is never cached.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::codec::ResponseCodec;
use super::invalidation::InvalidationController;
use super::key_deriver::KeyDeriver;
use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::models::{
    validate_namespace, AgentIdentity, CacheConfiguration, CacheEntry, CacheKey, CachedResponse,
};
use crate::domain::ports::CacheStore;

/// Point-in-time snapshot of cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    /// Lookups answered from the store.
    pub hits: u64,
    /// Lookups that found nothing usable, including undecodable entries.
    pub misses: u64,
    /// Stored entries that could not be decoded.
    pub decode_failures: u64,
    /// Successful store writes.
    pub writes: u64,
    /// Store writes that failed and were swallowed.
    pub write_failures: u64,
    /// Calls made with caching disabled for the agent.
    pub bypassed_disabled: u64,
    /// Calls made with an unusable cache configuration.
    pub bypassed_invalid_config: u64,
    /// Calls whose key could not be derived.
    pub bypassed_key_derivation: u64,
    /// Calls that skipped the cache because the store was unreachable.
    pub bypassed_store_unavailable: u64,
}

impl CacheStats {
    /// Hits over hits plus misses, `None` before any lookup.
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_ratio(&self) -> Option<f64> {
        let lookups = self.hits + self.misses;
        (lookups > 0).then(|| self.hits as f64 / lookups as f64)
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    decode_failures: AtomicU64,
    writes: AtomicU64,
    write_failures: AtomicU64,
    bypassed_disabled: AtomicU64,
    bypassed_invalid_config: AtomicU64,
    bypassed_key_derivation: AtomicU64,
    bypassed_store_unavailable: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            bypassed_disabled: self.bypassed_disabled.load(Ordering::Relaxed),
            bypassed_invalid_config: self.bypassed_invalid_config.load(Ordering::Relaxed),
            bypassed_key_derivation: self.bypassed_key_derivation.load(Ordering::Relaxed),
            bypassed_store_unavailable: self.bypassed_store_unavailable.load(Ordering::Relaxed),
        }
    }
}

/// Public entry point of the caching layer.
///
/// Holds the injected store and is cheap to share behind an `Arc`; no lock
/// is taken on any path, so concurrent misses for the same key may both
/// compute and both write the same value.
pub struct ResponseCache {
    store: Arc<dyn CacheStore>,
    deriver: KeyDeriver,
    codec: ResponseCodec,
    counters: Counters,
}

impl ResponseCache {
    /// Create a cache over `store` using the default `aiagent` namespace.
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self::build(store, KeyDeriver::default())
    }

    /// Create a cache over `store` with a custom key namespace.
    ///
    /// Fails with `InvalidConfiguration` if the namespace could not serve as
    /// a key segment.
    pub fn with_namespace(
        store: Arc<dyn CacheStore>,
        namespace: impl Into<String>,
    ) -> CacheResult<Self> {
        let namespace = namespace.into();
        validate_namespace(&namespace)?;
        Ok(Self::build(store, KeyDeriver::new(namespace)))
    }

    fn build(store: Arc<dyn CacheStore>, deriver: KeyDeriver) -> Self {
        Self {
            store,
            deriver,
            codec: ResponseCodec::new(),
            counters: Counters::default(),
        }
    }

    pub fn key_deriver(&self) -> &KeyDeriver {
        &self.deriver
    }

    /// Invalidation controller sharing this cache's store and namespace.
    pub fn invalidation(&self) -> InvalidationController {
        InvalidationController::new(Arc::clone(&self.store), self.deriver.namespace())
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// Derive the key `request` would be stored under.
    pub fn key_for<Req: Serialize + ?Sized>(
        &self,
        identity: &AgentIdentity,
        request: &Req,
    ) -> CacheResult<CacheKey> {
        self.deriver.derive(identity, request)
    }

    /// Return a cached response for `request`, or compute, store and return one.
    ///
    /// `compute` is awaited at most once. Its error is returned unchanged and
    /// nothing is written for it. Every cache-side failure falls back to
    /// calling `compute` directly.
    ///
    /// The key is built from the agent name and `config.version`, so bumping
    /// the configured version retires earlier entries even when the caller
    /// keeps passing an older identity.
    #[instrument(skip_all, fields(agent = %identity.name, version = config.version))]
    pub async fn get_or_compute<Req, Resp, E, F, Fut>(
        &self,
        identity: &AgentIdentity,
        config: &CacheConfiguration,
        request: &Req,
        compute: F,
    ) -> Result<Resp, E>
    where
        Req: Serialize + ?Sized,
        Resp: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Resp, E>>,
    {
        if !config.enabled {
            Counters::bump(&self.counters.bypassed_disabled);
            return compute().await;
        }

        if let Err(err) = config.validate() {
            Counters::bump(&self.counters.bypassed_invalid_config);
            warn!(error = %err, "invalid cache configuration, bypassing cache");
            return compute().await;
        }

        let identity = configured_identity(identity, config);
        let key = match self.deriver.derive(&identity, request) {
            Ok(key) => key,
            Err(err) => {
                Counters::bump(&self.counters.bypassed_key_derivation);
                warn!(error = %err, kind = err.kind(), "cannot derive cache key, bypassing cache");
                return compute().await;
            }
        };

        match self.store.get(key.as_str()).await {
            Ok(Some(bytes)) => match self.codec.decode::<Resp>(&bytes) {
                Ok(response) => {
                    Counters::bump(&self.counters.hits);
                    debug!(key = %key, "cache hit");
                    return Ok(response);
                }
                Err(err) => {
                    Counters::bump(&self.counters.decode_failures);
                    Counters::bump(&self.counters.misses);
                    warn!(key = %key, error = %err, "cached entry undecodable, treating as miss");
                }
            },
            Ok(None) => {
                Counters::bump(&self.counters.misses);
                debug!(key = %key, "cache miss");
            }
            Err(err) => {
                Counters::bump(&self.counters.bypassed_store_unavailable);
                warn!(
                    key = %key,
                    store = self.store.name(),
                    error = %err,
                    "cache store lookup failed, computing directly"
                );
                return compute().await;
            }
        }

        let response = compute().await?;
        self.write(key, config, &response).await;
        Ok(response)
    }

    /// Look up the stored entry for `request` without computing anything.
    ///
    /// Unlike [`get_or_compute`](Self::get_or_compute) this reports store and
    /// decode failures; it backs operator inspection.
    pub async fn peek<Req, Resp>(
        &self,
        identity: &AgentIdentity,
        request: &Req,
    ) -> CacheResult<Option<CachedResponse<Resp>>>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let key = self.deriver.derive(identity, request)?;
        match self.store.get(key.as_str()).await? {
            Some(bytes) => self.codec.decode_entry(&bytes).map(Some),
            None => Ok(None),
        }
    }

    async fn write<Resp: Serialize>(&self, key: CacheKey, config: &CacheConfiguration, response: &Resp) {
        let stored_at = chrono::Utc::now();
        let entry = match self.codec.encode_at(response, stored_at) {
            Ok(payload) => CacheEntry::new(key, payload, stored_at),
            Err(err) => {
                Counters::bump(&self.counters.write_failures);
                warn!(key = %key, error = %err, "response not encodable, skipping cache write");
                return;
            }
        };

        match self.store.set(entry.key.as_str(), &entry.payload, config.ttl()).await {
            Ok(()) => {
                Counters::bump(&self.counters.writes);
                debug!(
                    key = %entry.key,
                    bytes = entry.size_bytes(),
                    ttl_seconds = config.ttl_seconds,
                    "cached response"
                );
            }
            Err(err) => {
                Counters::bump(&self.counters.write_failures);
                log_write_failure(&entry.key, self.store.name(), &err);
            }
        }
    }
}

/// The identity whose version is the configured one.
fn configured_identity(identity: &AgentIdentity, config: &CacheConfiguration) -> AgentIdentity {
    if identity.version != config.version {
        debug!(
            caller_version = identity.version,
            configured_version = config.version,
            "using configured agent version for cache key"
        );
    }
    AgentIdentity::new(identity.name.as_str(), config.version)
}

fn log_write_failure(key: &CacheKey, store: &str, err: &CacheError) {
    warn!(
        key = %key,
        store,
        kind = err.kind(),
        error = %err,
        "cache write failed, returning computed response"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::MemoryCacheStore;
    use crate::domain::models::AgentResponse;
    use crate::domain::ports::NullCacheStore;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn memory_cache() -> (Arc<MemoryCacheStore>, ResponseCache) {
        let store = Arc::new(MemoryCacheStore::new());
        let cache = ResponseCache::new(store.clone());
        (store, cache)
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let (_store, cache) = memory_cache();
        let identity = AgentIdentity::new("summarizer", 1);
        let config = CacheConfiguration::enabled_with_ttl(3600);
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let response: Result<AgentResponse, String> = cache
                .get_or_compute(&identity, &config, &json!({"text": "hello"}), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(AgentResponse::new("hi"))
                })
                .await;
            assert_eq!(response.unwrap().text, "hi");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.hit_ratio(), Some(2.0 / 3.0));
    }

    #[tokio::test]
    async fn test_invalid_ttl_bypasses_without_writing() {
        let (store, cache) = memory_cache();
        let identity = AgentIdentity::new("summarizer", 1);
        let config = CacheConfiguration::enabled_with_ttl(0);

        let response: Result<String, String> = cache
            .get_or_compute(&identity, &config, &json!({}), || async { Ok("fresh".to_string()) })
            .await;

        assert_eq!(response.unwrap(), "fresh");
        assert_eq!(store.entry_count().await, 0);
        let stats = cache.stats();
        assert_eq!(stats.bypassed_invalid_config, 1);
        assert_eq!(stats.bypassed_key_derivation, 0);
    }

    #[tokio::test]
    async fn test_configured_version_bump_recomputes() {
        let (_store, cache) = memory_cache();
        let identity = AgentIdentity::new("summarizer", 1);
        let v1 = CacheConfiguration::enabled_with_ttl(3600);
        let v2 = v1.with_version(2);
        let request = json!({"text": "hello"});

        let old: Result<AgentResponse, String> = cache
            .get_or_compute(&identity, &v1, &request, || async { Ok(AgentResponse::new("old")) })
            .await;
        let bumped: Result<AgentResponse, String> = cache
            .get_or_compute(&identity, &v2, &request, || async { Ok(AgentResponse::new("new")) })
            .await;

        assert_eq!(old.unwrap().text, "old");
        assert_eq!(bumped.unwrap().text, "new");
        let stats = cache.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.writes, 2);

        // The entry written under v2 is keyed by the configured version.
        let stored: Option<CachedResponse<AgentResponse>> = cache
            .peek(&AgentIdentity::new("summarizer", 2), &request)
            .await
            .unwrap();
        assert_eq!(stored.unwrap().response.text, "new");
    }

    #[test]
    fn test_with_namespace_rejects_unusable_namespace() {
        for bad in ["", "ai:agent", "ai*", "ai agent"] {
            let result = ResponseCache::with_namespace(Arc::new(NullCacheStore::new()), bad);
            assert!(
                matches!(result, Err(CacheError::InvalidConfiguration(_))),
                "{bad:?} should be rejected"
            );
        }

        let cache = ResponseCache::with_namespace(Arc::new(NullCacheStore::new()), "staging")
            .expect("plain namespace is valid");
        assert_eq!(cache.key_deriver().namespace(), "staging");
    }

    #[tokio::test]
    async fn test_peek_reports_stored_entry() {
        let (_store, cache) = memory_cache();
        let identity = AgentIdentity::new("summarizer", 1);
        let config = CacheConfiguration::enabled_with_ttl(3600);
        let request = json!({"text": "hello"});

        let before: Option<CachedResponse<AgentResponse>> = cache.peek(&identity, &request).await.unwrap();
        assert!(before.is_none());

        let _: Result<AgentResponse, String> = cache
            .get_or_compute(&identity, &config, &request, || async { Ok(AgentResponse::new("hi")) })
            .await;

        let after: CachedResponse<AgentResponse> =
            cache.peek(&identity, &request).await.unwrap().unwrap();
        assert_eq!(after.response.text, "hi");
    }

    #[tokio::test]
    async fn test_null_store_always_computes() {
        let cache = ResponseCache::new(Arc::new(NullCacheStore::new()));
        let identity = AgentIdentity::new("summarizer", 1);
        let config = CacheConfiguration::enabled_with_ttl(3600);
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let _: Result<u32, String> = cache
                .get_or_compute(&identity, &config, &json!({"n": 1}), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats().writes, 2);
    }

    #[test]
    fn test_hit_ratio_empty() {
        assert_eq!(CacheStats::default().hit_ratio(), None);
    }
}
