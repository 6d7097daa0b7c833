//! `agent-cache key`: print the cache key a request maps to.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::{parse_payload, resolve_identity};
use crate::cli::output::{output, truncate, CommandOutput};
use crate::domain::models::Config;
use crate::services::{KeyDeriver, NormalizedRequest};

#[derive(Args, Debug)]
pub struct KeyArgs {
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
pub struct KeyOutput {
    pub agent: String,
    pub version: u32,
    pub key: String,
    pub normalized: String,
}

impl CommandOutput for KeyOutput {
    fn to_human(&self) -> String {
        format!(
            "{}\n  agent:      {}@v{}\n  normalized: {}",
            self.key,
            self.agent,
            self.version,
            truncate(&self.normalized, 120)
        )
    }
}

pub fn run(args: &KeyArgs, config: &Config) -> Result<KeyOutput> {
    let identity = resolve_identity(config, &args.agent, args.version)?;
    let payload = parse_payload(&args.payload)?;

    let normalized = NormalizedRequest::from_value(&payload);
    let key = KeyDeriver::new(config.namespace.as_str()).derive_normalized(&identity, &normalized);

    Ok(KeyOutput {
        agent: identity.name,
        version: identity.version,
        key: key.into_string(),
        normalized: normalized.as_str().to_string(),
    })
}

pub async fn execute(args: KeyArgs, config: &Config, json_mode: bool) -> Result<()> {
    let result = run(&args, config)?;
    output(&result, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(agent: &str, version: Option<u32>, payload: &str) -> KeyArgs {
        KeyArgs {
            agent: agent.to_string(),
            version,
            payload: payload.to_string(),
        }
    }

    #[test]
    fn test_key_for_summarizer_request() {
        let config = Config::default();
        let result = run(&args("summarizer", None, r#"{"text":"hello"}"#), &config).unwrap();

        assert_eq!(result.normalized, "text=hello");
        assert!(result.key.starts_with("aiagent:summarizer:v1:"));
        assert_eq!(result.key.len(), "aiagent:summarizer:v1:".len() + 64);
    }

    #[test]
    fn test_key_respects_namespace_and_version() {
        let mut config = Config::default();
        config.namespace = "staging".to_string();
        let result = run(&args("summarizer", Some(3), r#"{"text":"hello"}"#), &config).unwrap();
        assert!(result.key.starts_with("staging:summarizer:v3:"));
    }

    #[test]
    fn test_key_matches_deriver() {
        let config = Config::default();
        let result = run(&args("triage", None, r#"{"b":1,"a":"x"}"#), &config).unwrap();

        let expected = KeyDeriver::default()
            .derive(
                &crate::domain::models::AgentIdentity::new("triage", 1),
                &serde_json::json!({"a": "x", "b": 1}),
            )
            .unwrap();
        assert_eq!(result.key, expected.as_str());
    }
}
