//! `agent-cache inspect`: show what is cached for a request.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::{open_store, parse_payload, resolve_identity};
use crate::cli::output::{output, truncate, CommandOutput};
use crate::domain::models::Config;
use crate::domain::ports::CacheStore;
use crate::services::ResponseCache;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Agent name
    #[arg(short, long)]
    pub agent: String,

    /// Agent version (defaults to the configured version)
    #[arg(long)]
    pub version: Option<u32>,

    /// Request payload as JSON, or `-` to read it from stdin
    pub payload: String,
}

#[derive(Debug, Serialize)]
pub struct InspectOutput {
    pub key: String,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
}

impl CommandOutput for InspectOutput {
    fn to_human(&self) -> String {
        match (&self.stored_at, &self.response) {
            (Some(stored_at), Some(response)) => {
                let rendered = serde_json::to_string_pretty(response).unwrap_or_default();
                format!(
                    "HIT {}\n  stored:   {} ({}s ago)\n  response: {}",
                    self.key,
                    stored_at.to_rfc3339(),
                    self.age_seconds.unwrap_or_default(),
                    truncate(&rendered, 2_000)
                )
            }
            _ => format!("MISS {}", self.key),
        }
    }
}

pub async fn run(args: &InspectArgs, config: &Config, store: Arc<dyn CacheStore>) -> Result<InspectOutput> {
    let identity = resolve_identity(config, &args.agent, args.version)?;
    let payload = parse_payload(&args.payload)?;

    let cache = ResponseCache::with_namespace(store, config.namespace.as_str())?;
    let key = cache.key_for(&identity, &payload)?;
    let entry = cache
        .peek::<Value, Value>(&identity, &payload)
        .await
        .with_context(|| format!("Failed to read cache entry {key}"))?;

    Ok(match entry {
        Some(entry) => InspectOutput {
            key: key.into_string(),
            found: true,
            stored_at: Some(entry.stored_at),
            age_seconds: Some(entry.age_at(Utc::now()).num_seconds()),
            response: Some(entry.response),
        },
        None => InspectOutput {
            key: key.into_string(),
            found: false,
            stored_at: None,
            age_seconds: None,
            response: None,
        },
    })
}

pub async fn execute(args: InspectArgs, config: &Config, json_mode: bool) -> Result<()> {
    let store = open_store(config)?;
    let result = run(&args, config, store).await?;
    output(&result, json_mode);
    Ok(())
}
