//! Store adapters satisfying the `CacheStore` port.

pub mod cache;
pub mod redis;

pub use self::cache::MemoryCacheStore;
pub use self::redis::RedisCacheStore;
