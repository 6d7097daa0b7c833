//! CLI command implementations.

pub mod config;
pub mod inspect;
pub mod invalidate;
pub mod key;

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Read;
use std::sync::Arc;

use crate::adapters::RedisCacheStore;
use crate::domain::models::{AgentIdentity, Config};

/// Parse a request payload given on the command line; `-` reads it from stdin.
pub(crate) fn parse_payload(raw: &str) -> Result<Value> {
    let text = if raw == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read payload from stdin")?;
        buffer
    } else {
        raw.to_string()
    };

    serde_json::from_str(&text).context("Payload is not valid JSON")
}

/// Resolve the agent identity, taking the version from config unless overridden.
pub(crate) fn resolve_identity(
    config: &Config,
    agent: &str,
    version: Option<u32>,
) -> Result<AgentIdentity> {
    let version = version.unwrap_or_else(|| config.agent(agent).version);
    let identity = AgentIdentity::new(agent, version);
    identity.validate()?;
    Ok(identity)
}

pub(crate) fn open_store(config: &Config) -> Result<Arc<RedisCacheStore>> {
    let store = RedisCacheStore::from_config(&config.store)
        .context("Failed to configure cache store client")?;
    Ok(Arc::new(store))
}
