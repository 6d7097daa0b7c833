use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::agent::AgentIdentity;

/// Namespace prefix every key on the wire starts with.
pub const DEFAULT_NAMESPACE: &str = "aiagent";

/// Deterministic key identifying one cacheable computation.
///
/// Layout: `{namespace}:{agent}:v{version}:{sha256 hex}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub(crate) fn compose(namespace: &str, identity: &AgentIdentity, digest_hex: &str) -> Self {
        Self(format!(
            "{}{}",
            version_prefix(namespace, &identity.name, identity.version),
            digest_hex
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The trailing content digest.
    pub fn digest(&self) -> &str {
        self.0.rsplit(':').next().unwrap_or_default()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Prefix shared by every key of an agent, across all versions.
pub fn agent_prefix(namespace: &str, agent_name: &str) -> String {
    format!("{namespace}:{agent_name}:")
}

/// Prefix shared by every key of one agent version.
pub fn version_prefix(namespace: &str, agent_name: &str, version: u32) -> String {
    format!("{namespace}:{agent_name}:v{version}:")
}

/// An encoded response about to be written to the store.
///
/// Entries are never mutated; a later write for the same key replaces the
/// whole value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub payload: Vec<u8>,
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(key: CacheKey, payload: Vec<u8>, stored_at: DateTime<Utc>) -> Self {
        Self {
            key,
            payload,
            stored_at,
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.payload.len()
    }
}

/// A decoded hit together with the time it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResponse<R> {
    pub stored_at: DateTime<Utc>,
    pub response: R,
}

impl<R> CachedResponse<R> {
    /// Age of the entry relative to `now`, zero if the clock went backwards.
    pub fn age_at(&self, now: DateTime<Utc>) -> chrono::Duration {
        (now - self.stored_at).max(chrono::Duration::zero())
    }
}

/// The typical agent result shape: generated text plus free-form metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub text: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl AgentResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}
