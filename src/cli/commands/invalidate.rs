//! `agent-cache invalidate`: drop cached responses for an agent.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use super::open_store;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::domain::ports::CacheStore;
use crate::infrastructure::logging::AuditLogger;
use crate::services::InvalidationController;

#[derive(Args, Debug)]
pub struct InvalidateArgs {
    /// Agent name
    pub agent: String,

    /// Only drop entries written under this version
    #[arg(long)]
    pub version: Option<u32>,

    /// Who is invalidating, recorded in the audit log (defaults to $USER)
    #[arg(long)]
    pub actor: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvalidateOutput {
    pub agent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    pub removed: u64,
}

impl CommandOutput for InvalidateOutput {
    fn to_human(&self) -> String {
        let scope = match self.version {
            Some(version) => format!("{} v{}", self.agent, version),
            None => format!("{} (all versions)", self.agent),
        };
        format!("Removed {} cached response(s) for {}", self.removed, scope)
    }
}

fn actor_name(args: &InvalidateArgs) -> String {
    args.actor
        .clone()
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "cli".to_string())
}

pub async fn run(
    args: &InvalidateArgs,
    config: &Config,
    store: Arc<dyn CacheStore>,
) -> Result<InvalidateOutput> {
    let controller = InvalidationController::new(store, config.namespace.as_str());

    let result = match args.version {
        Some(version) => controller.invalidate_version(&args.agent, version).await,
        None => controller.invalidate_agent(&args.agent).await,
    };

    if let Some(ref audit_path) = config.logging.audit_log {
        let audited = result.as_ref().map(|removed| *removed).map_err(ToString::to_string);
        let recorded = match AuditLogger::new(audit_path).await {
            Ok(logger) => {
                logger
                    .log_invalidation(&actor_name(args), &args.agent, args.version, &audited)
                    .await
            }
            Err(err) => Err(err),
        };
        if let Err(err) = recorded {
            warn!(path = %audit_path, error = %err, "failed to record invalidation in audit log");
        }
    }

    let removed = result.with_context(|| format!("Failed to invalidate agent '{}'", args.agent))?;

    Ok(InvalidateOutput {
        agent: args.agent.clone(),
        version: args.version,
        removed,
    })
}

pub async fn execute(args: InvalidateArgs, config: &Config, json_mode: bool) -> Result<()> {
    let store = open_store(config)?;
    let result = run(&args, config, store).await?;
    output(&result, json_mode);
    Ok(())
}
