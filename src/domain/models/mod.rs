pub mod agent;
pub mod cache_config;
pub mod config;
pub mod entry;

pub use agent::{validate_agent_name, validate_namespace, AgentIdentity};
pub use cache_config::{CacheConfiguration, DEFAULT_TTL_SECONDS};
pub use config::{Config, LoggingConfig, StoreConfig};
pub use entry::{
    agent_prefix, version_prefix, AgentResponse, CacheEntry, CacheKey, CachedResponse,
    DEFAULT_NAMESPACE,
};
