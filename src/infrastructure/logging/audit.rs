//! Audit logging for operator actions against the cache
//!
//! Every invalidation is appended as one JSON line so that cache wipes can be
//! traced back to who triggered them.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Audit logger for operator actions
#[derive(Clone)]
pub struct AuditLogger {
    log_file: Arc<Mutex<File>>,
}

/// Audit event types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    AgentInvalidated,
    VersionInvalidated,
}

/// Outcome of an audited operation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Failure,
}

/// Complete audit event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: AuditEventType,
    pub actor: String,
    pub agent: String,
    pub version: Option<u32>,
    pub outcome: AuditOutcome,
    pub metadata: Option<Value>,
}

impl AuditLogger {
    /// Create a new audit logger appending to the specified file
    ///
    /// Creates parent directories if they don't exist.
    pub async fn new(log_path: impl AsRef<Path>) -> Result<Self> {
        let log_path = log_path.as_ref();

        if let Some(parent) = log_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("failed to create audit log directory")?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .context("failed to open audit log file")?;

        Ok(Self {
            log_file: Arc::new(Mutex::new(file)),
        })
    }

    /// Write the event as a JSON line and mirror it to tracing
    pub async fn log_event(&self, event: AuditEvent) -> Result<()> {
        let json = serde_json::to_string(&event).context("failed to serialize audit event")?;

        {
            let mut file = self
                .log_file
                .lock()
                .map_err(|e| anyhow::anyhow!("audit log mutex poisoned: {e}"))?;

            writeln!(file, "{json}").context("failed to write audit event")?;
            file.flush().context("failed to flush audit log")?;
        }

        info!(
            event_type = ?event.event_type,
            actor = %event.actor,
            agent = %event.agent,
            version = ?event.version,
            outcome = ?event.outcome,
            "audit event"
        );

        Ok(())
    }

    /// Record an invalidation request and its result
    ///
    /// `version` of `None` means every version of the agent was targeted.
    /// On success `removed` is written into the event metadata; on failure the
    /// error text is recorded instead.
    pub async fn log_invalidation(
        &self,
        actor: &str,
        agent: &str,
        version: Option<u32>,
        result: &Result<u64, String>,
    ) -> Result<()> {
        let event_type = if version.is_some() {
            AuditEventType::VersionInvalidated
        } else {
            AuditEventType::AgentInvalidated
        };

        let (outcome, metadata) = match result {
            Ok(removed) => (AuditOutcome::Success, serde_json::json!({ "removed": removed })),
            Err(error) => (AuditOutcome::Failure, serde_json::json!({ "error": error })),
        };

        self.log_event(AuditEvent {
            timestamp: Utc::now(),
            event_type,
            actor: actor.to_string(),
            agent: agent.to_string(),
            version,
            outcome,
            metadata: Some(metadata),
        })
        .await
    }
}
