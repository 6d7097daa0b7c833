//! In-process cache store.
//!
//! Uses `moka` for concurrent caching with per-entry TTL. Suitable for tests
//! and single-node deployments where no shared store is available.

pub mod memory_store;

pub use memory_store::MemoryCacheStore;
