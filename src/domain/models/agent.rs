use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::errors::{CacheError, CacheResult};

/// Characters an agent name may not contain.
///
/// `:` separates key segments, the rest are glob metacharacters that would
/// widen a prefix scan beyond the agent's own keys.
const FORBIDDEN_NAME_CHARS: &[char] = &[':', '*', '?', '[', ']', '\\'];

/// Identity of the agent whose responses are cached.
///
/// The version is operator-controlled and is bumped whenever the agent's
/// behaviour changes enough that earlier answers must no longer be served.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentIdentity {
    /// Agent name, e.g. "summarizer"
    pub name: String,

    /// Behavioural version, starts at 1
    pub version: u32,
}

impl AgentIdentity {
    pub fn new(name: impl Into<String>, version: u32) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }

    /// Check that the identity can be embedded in a cache key.
    pub fn validate(&self) -> CacheResult<()> {
        validate_agent_name(&self.name)?;
        if self.version == 0 {
            return Err(CacheError::KeyDerivation(format!(
                "agent '{}' has version 0, versions start at 1",
                self.name
            )));
        }
        Ok(())
    }
}

impl fmt::Display for AgentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@v{}", self.name, self.version)
    }
}

/// Validate an agent name for use as a key segment.
pub fn validate_agent_name(name: &str) -> CacheResult<()> {
    if name.is_empty() {
        return Err(CacheError::KeyDerivation(
            "agent name cannot be empty".to_string(),
        ));
    }

    if let Some(bad) = name
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || FORBIDDEN_NAME_CHARS.contains(c))
    {
        return Err(CacheError::KeyDerivation(format!(
            "agent name '{}' contains forbidden character {:?}",
            name.escape_debug(),
            bad
        )));
    }

    Ok(())
}

/// Validate a key namespace.
///
/// The namespace is the first key segment and the root of every
/// invalidation prefix, so it follows the agent name rules.
pub fn validate_namespace(namespace: &str) -> CacheResult<()> {
    validate_agent_name(namespace).map_err(|_| {
        CacheError::InvalidConfiguration(format!(
            "namespace '{}' must be non-empty and free of ':', whitespace and glob characters",
            namespace.escape_debug()
        ))
    })
}
