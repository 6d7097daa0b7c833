use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;
use crate::domain::models::{validate_agent_name, validate_namespace};
use crate::infrastructure::logging::RotationPolicy;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid namespace: {0:?}. Must be non-empty and contain no ':', whitespace or glob characters")]
    InvalidNamespace(String),

    #[error("Store URL cannot be empty")]
    EmptyStoreUrl,

    #[error("Invalid connect_timeout_ms: {0}. Must be at least 1")]
    InvalidConnectTimeout(u64),

    #[error("Invalid operation_timeout_ms: {0}. Must be at least 1")]
    InvalidOperationTimeout(u64),

    #[error("Invalid scan_batch_size: {0}. Must be at least 1")]
    InvalidScanBatchSize(usize),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),

    #[error("Invalid cache settings for {scope}: {reason}")]
    InvalidAgentConfig { scope: String, reason: String },
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .agent-cache/config.yaml (project config)
    /// 3. .agent-cache/local.yaml (local overrides, optional)
    /// 4. Environment variables (AGENT_CACHE_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Self::base_figment()
            .merge(Yaml::file(".agent-cache/config.yaml"))
            .merge(Yaml::file(".agent-cache/local.yaml"))
            .merge(Env::prefixed("AGENT_CACHE_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring environment overrides
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Self::base_figment()
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("AGENT_CACHE_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn base_figment() -> Figment {
        Figment::new().merge(Serialized::defaults(Config::default()))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if validate_namespace(&config.namespace).is_err() {
            return Err(ConfigError::InvalidNamespace(config.namespace.clone()));
        }

        // Validate store config
        if config.store.url.trim().is_empty() {
            return Err(ConfigError::EmptyStoreUrl);
        }

        if config.store.connect_timeout_ms == 0 {
            return Err(ConfigError::InvalidConnectTimeout(
                config.store.connect_timeout_ms,
            ));
        }

        if config.store.operation_timeout_ms == 0 {
            return Err(ConfigError::InvalidOperationTimeout(
                config.store.operation_timeout_ms,
            ));
        }

        if config.store.scan_batch_size == 0 {
            return Err(ConfigError::InvalidScanBatchSize(config.store.scan_batch_size));
        }

        // Validate logging config
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if RotationPolicy::parse(&config.logging.rotation).is_none() {
            return Err(ConfigError::InvalidLogRotation(config.logging.rotation.clone()));
        }

        // Validate cache settings
        config
            .defaults
            .validate()
            .map_err(|e| ConfigError::InvalidAgentConfig {
                scope: "defaults".to_string(),
                reason: e.to_string(),
            })?;

        for (name, agent) in &config.agents {
            validate_agent_name(name).map_err(|e| ConfigError::InvalidAgentConfig {
                scope: format!("agent '{name}'"),
                reason: e.to_string(),
            })?;
            agent.validate().map_err(|e| ConfigError::InvalidAgentConfig {
                scope: format!("agent '{name}'"),
                reason: e.to_string(),
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::CacheConfiguration;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.namespace, "aiagent");
        assert_eq!(config.store.url, "redis://127.0.0.1:6379/0");
        assert_eq!(config.logging.level, "info");
        assert!(!config.defaults.enabled);
        assert_eq!(config.defaults.ttl_seconds, 7_776_000);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
namespace: aiagent
store:
  url: redis://cache.internal:6380/1
  operation_timeout_ms: 250
logging:
  level: debug
  format: pretty
agents:
  summarizer:
    enabled: true
    ttl_seconds: 3600
  triage:
    enabled: true
    version: 3
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.store.url, "redis://cache.internal:6380/1");
        assert_eq!(config.store.operation_timeout_ms, 250);
        assert_eq!(config.store.connect_timeout_ms, 2_000);
        assert_eq!(config.logging.format, "pretty");

        let summarizer = config.agent("summarizer");
        assert!(summarizer.enabled);
        assert_eq!(summarizer.ttl_seconds, 3600);
        assert_eq!(summarizer.version, 1);

        let triage = config.agent("triage");
        assert_eq!(triage.version, 3);
        assert_eq!(triage.ttl_seconds, 7_776_000);

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_invalid_namespace() {
        let mut config = Config::default();
        config.namespace = "ai:agent".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidNamespace(_))
        ));
    }

    #[test]
    fn test_validate_empty_store_url() {
        let mut config = Config::default();
        config.store.url = "  ".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyStoreUrl)
        ));
    }

    #[test]
    fn test_validate_zero_timeouts() {
        let mut config = Config::default();
        config.store.connect_timeout_ms = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidConnectTimeout(0))
        ));

        let mut config = Config::default();
        config.store.operation_timeout_ms = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidOperationTimeout(0))
        ));
    }

    #[test]
    fn test_validate_zero_scan_batch() {
        let mut config = Config::default();
        config.store.scan_batch_size = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidScanBatchSize(0))
        ));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidLogLevel(level)) => assert_eq!(level, "invalid"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogFormat(_))
        ));
    }

    #[test]
    fn test_validate_invalid_log_rotation() {
        let mut config = Config::default();
        config.logging.rotation = "weekly".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogRotation(_))
        ));

        config.logging.rotation = "hourly".to_string();
        ConfigLoader::validate(&config).expect("hourly rotation should be valid");
    }

    #[test]
    fn test_validate_zero_ttl_agent() {
        let mut config = Config::default();
        config
            .agents
            .insert("summarizer".to_string(), CacheConfiguration::enabled_with_ttl(0));

        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidAgentConfig { scope, .. }) => {
                assert_eq!(scope, "agent 'summarizer'");
            }
            other => panic!("Expected InvalidAgentConfig error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_bad_agent_name() {
        let mut config = Config::default();
        config
            .agents
            .insert("bad name".to_string(), CacheConfiguration::default());
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn test_env_override() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "store:\n  url: redis://from-file:6379/0\nagents:\n  summarizer:\n    enabled: false"
        )
        .unwrap();
        file.flush().unwrap();

        temp_env::with_vars(
            [
                ("AGENT_CACHE_STORE__URL", Some("redis://from-env:6379/0")),
                ("AGENT_CACHE_AGENTS__SUMMARIZER__ENABLED", Some("true")),
                ("AGENT_CACHE_AGENTS__SUMMARIZER__VERSION", Some("2")),
            ],
            || {
                let config = ConfigLoader::load_from_file(file.path()).unwrap();
                assert_eq!(config.store.url, "redis://from-env:6379/0");
                let summarizer = config.agent("summarizer");
                assert!(summarizer.enabled);
                assert_eq!(summarizer.version, 2);
            },
        );
    }

    #[test]
    fn test_hierarchical_merging() {
        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(
            base_file,
            "namespace: aiagent\nlogging:\n  level: info\n  format: json"
        )
        .unwrap();
        base_file.flush().unwrap();

        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(override_file, "logging:\n  level: debug").unwrap();
        override_file.flush().unwrap();

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(
            config.logging.level, "debug",
            "Override should win for nested fields"
        );
        assert_eq!(
            config.logging.format, "json",
            "Base value should persist when not overridden"
        );
    }
}
