//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the async trait interface that store adapters must implement:
//! - CacheStore: get / set-with-TTL / delete-by-prefix against a key-value store
//!
//! The trait keeps the orchestrator independent of any particular backend,
//! so tests can inject an in-memory or deliberately failing store.

pub mod cache_store;
pub mod null_cache_store;

pub use cache_store::CacheStore;
pub use null_cache_store::NullCacheStore;
