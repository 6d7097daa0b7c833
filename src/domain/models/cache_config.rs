use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::agent::AgentIdentity;
use crate::domain::errors::{CacheError, CacheResult};

/// Per-agent cache settings, supplied on every invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CacheConfiguration {
    /// Whether responses for this agent are cached at all
    #[serde(default)]
    pub enabled: bool,

    /// Time-to-live for stored entries, must be positive
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,

    /// Behavioural version; bumping it retires every older entry
    #[serde(default = "default_version")]
    pub version: u32,
}

/// 90 days.
pub const DEFAULT_TTL_SECONDS: u64 = 7_776_000;

const fn default_ttl_seconds() -> u64 {
    DEFAULT_TTL_SECONDS
}

const fn default_version() -> u32 {
    1
}

impl Default for CacheConfiguration {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_seconds: default_ttl_seconds(),
            version: default_version(),
        }
    }
}

impl CacheConfiguration {
    /// Enabled configuration with the given TTL and version 1.
    pub fn enabled_with_ttl(ttl_seconds: u64) -> Self {
        Self {
            enabled: true,
            ttl_seconds,
            ..Self::default()
        }
    }

    /// Return a copy with a different version.
    #[must_use]
    pub const fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Build the identity an invocation of `agent_name` runs under.
    pub fn identity(&self, agent_name: impl Into<String>) -> AgentIdentity {
        AgentIdentity::new(agent_name, self.version)
    }

    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    /// Reject settings that would store without expiry or break the key format.
    pub fn validate(&self) -> CacheResult<()> {
        if self.ttl_seconds == 0 {
            return Err(CacheError::InvalidConfiguration(
                "ttl_seconds must be positive, entries without expiry are not allowed".to_string(),
            ));
        }
        if self.version == 0 {
            return Err(CacheError::InvalidConfiguration(
                "version must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
