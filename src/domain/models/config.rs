use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use super::cache_config::CacheConfiguration;
use super::entry::DEFAULT_NAMESPACE;

/// Main configuration structure for the agent response cache
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Key namespace prefix
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Key-value store connection settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Settings applied to agents without an entry in `agents`
    #[serde(default)]
    pub defaults: CacheConfiguration,

    /// Per-agent overrides keyed by agent name
    #[serde(default)]
    pub agents: BTreeMap<String, CacheConfiguration>,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            store: StoreConfig::default(),
            logging: LoggingConfig::default(),
            defaults: CacheConfiguration::default(),
            agents: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Resolve the cache configuration for an agent.
    pub fn agent(&self, name: &str) -> CacheConfiguration {
        self.agents.get(name).copied().unwrap_or(self.defaults)
    }
}

/// Key-value store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StoreConfig {
    /// Store URL, e.g. `redis://cache.internal:6379/0`
    #[serde(default = "default_store_url")]
    pub url: String,

    /// Password, usually supplied through `AGENT_CACHE_STORE__PASSWORD`
    #[serde(default)]
    pub password: Option<String>,

    /// Upper bound on establishing a connection
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Upper bound on a single round trip
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,

    /// Keys requested per SCAN page during prefix deletion
    #[serde(default = "default_scan_batch_size")]
    pub scan_batch_size: usize,
}

fn default_store_url() -> String {
    "redis://127.0.0.1:6379/0".to_string()
}

const fn default_connect_timeout_ms() -> u64 {
    2_000
}

const fn default_operation_timeout_ms() -> u64 {
    500
}

const fn default_scan_batch_size() -> usize {
    500
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            password: None,
            connect_timeout_ms: default_connect_timeout_ms(),
            operation_timeout_ms: default_operation_timeout_ms(),
            scan_batch_size: default_scan_batch_size(),
        }
    }
}

impl StoreConfig {
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub const fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Log file rotation: daily, hourly or never
    #[serde(default = "default_log_rotation")]
    pub rotation: String,

    /// JSON-lines audit trail of operator actions
    #[serde(default = "default_audit_log")]
    pub audit_log: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}

#[allow(clippy::unnecessary_wraps)]
fn default_audit_log() -> Option<String> {
    Some(".agent-cache/audit.log".to_string())
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_log_rotation(),
            audit_log: default_audit_log(),
        }
    }
}
