//! Explicit, operator-triggered cache invalidation.
//!
//! Bumping an agent's configured version retires its old entries lazily: they
//! are no longer looked up and expire through their TTL. The controller here
//! is for clearing entries immediately.

use std::sync::Arc;
use tracing::{info, instrument};

use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::models::{agent_prefix, validate_agent_name, validate_namespace, version_prefix};
use crate::domain::ports::CacheStore;

/// Deletes stored entries by agent, optionally scoped to one version.
///
/// This is the only component that removes entries out of band.
pub struct InvalidationController {
    store: Arc<dyn CacheStore>,
    namespace: String,
}

impl InvalidationController {
    pub fn new(store: Arc<dyn CacheStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    /// Remove every entry of `agent_name` across all versions.
    ///
    /// # Returns
    /// Number of entries removed
    #[instrument(skip(self), fields(store = self.store.name()))]
    pub async fn invalidate_agent(&self, agent_name: &str) -> CacheResult<u64> {
        validate_namespace(&self.namespace)?;
        validate_agent_name(agent_name)?;
        let prefix = agent_prefix(&self.namespace, agent_name);
        let removed = self.store.delete_prefix(&prefix).await?;
        info!(agent = agent_name, removed, "invalidated agent cache entries");
        Ok(removed)
    }

    /// Remove the entries of a single `agent_name` version.
    #[instrument(skip(self), fields(store = self.store.name()))]
    pub async fn invalidate_version(&self, agent_name: &str, version: u32) -> CacheResult<u64> {
        validate_namespace(&self.namespace)?;
        validate_agent_name(agent_name)?;
        if version == 0 {
            return Err(CacheError::KeyDerivation(
                "versions start at 1".to_string(),
            ));
        }
        let prefix = version_prefix(&self.namespace, agent_name, version);
        let removed = self.store.delete_prefix(&prefix).await?;
        info!(agent = agent_name, version, removed, "invalidated agent version cache entries");
        Ok(removed)
    }
}
