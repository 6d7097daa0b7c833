//! Agent Response Cache
//!
//! A fail-open cache for AI-agent invocations. Responses are stored in a
//! shared key-value store under keys derived from the agent's name, its
//! operator-controlled version and a SHA-256 digest of the normalized request.
//! Any cache-side failure falls back to invoking the agent directly.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, errors and the `CacheStore` port
//! - **Service Layer** (`services`): Key derivation, codec, orchestration, invalidation
//! - **Adapters** (`adapters`): Redis and in-memory store implementations
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Operator command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use agent_response_cache::{AgentResponse, CacheConfiguration, RedisCacheStore, ResponseCache};
//!
//! let store = Arc::new(RedisCacheStore::from_config(&config.store)?);
//! let cache = ResponseCache::new(store);
//! let settings = CacheConfiguration::enabled_with_ttl(3600);
//! let response: Result<AgentResponse, MyError> = cache
//!     .get_or_compute(&settings.identity("summarizer"), &settings, &request, || {
//!         summarizer.run(&request)
//!     })
//!     .await;
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::{MemoryCacheStore, RedisCacheStore};
pub use domain::errors::{CacheError, CacheResult};
pub use domain::models::{
    AgentIdentity, AgentResponse, CacheConfiguration, CacheKey, CachedResponse, Config,
};
pub use domain::ports::{CacheStore, NullCacheStore};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{CacheStats, InvalidationController, KeyDeriver, ResponseCache};
