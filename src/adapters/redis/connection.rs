//! Redis client construction and bounded connection setup.

use redis::aio::ConnectionManager;
use redis::{Client, IntoConnectionInfo};
use std::time::Duration;
use tokio::time::timeout;

use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::models::StoreConfig;

#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub connect_timeout: Duration,
    pub operation_timeout: Duration,
    pub scan_batch_size: usize,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self::from(&StoreConfig::default())
    }
}

impl From<&StoreConfig> for ConnectionSettings {
    fn from(config: &StoreConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout(),
            operation_timeout: config.operation_timeout(),
            scan_batch_size: config.scan_batch_size.max(1),
        }
    }
}

/// Build a client from the configured URL, applying a separately supplied password.
///
/// No connection is made here.
pub fn open_client(config: &StoreConfig) -> CacheResult<Client> {
    let mut info = config
        .url
        .as_str()
        .into_connection_info()
        .map_err(|e| CacheError::InvalidConfiguration(format!("invalid store URL: {e}")))?;

    if let Some(password) = &config.password {
        info.redis.password = Some(password.clone());
    }

    Client::open(info)
        .map_err(|e| CacheError::InvalidConfiguration(format!("invalid store settings: {e}")))
}

/// Establish a multiplexed, auto-reconnecting connection within `connect_timeout`.
pub async fn connect(client: &Client, connect_timeout: Duration) -> CacheResult<ConnectionManager> {
    match timeout(connect_timeout, ConnectionManager::new(client.clone())).await {
        Ok(Ok(manager)) => Ok(manager),
        Ok(Err(e)) => Err(CacheError::StoreUnavailable(format!("connect failed: {e}"))),
        Err(_) => Err(CacheError::StoreUnavailable(format!(
            "connect timed out after {}ms",
            connect_timeout.as_millis()
        ))),
    }
}

/// Round-trip a PING to prove the connection and credentials work.
pub async fn verify_connection(
    manager: &mut ConnectionManager,
    operation_timeout: Duration,
) -> CacheResult<()> {
    let ping = redis::cmd("PING");
    let reply: Result<redis::RedisResult<String>, _> =
        timeout(operation_timeout, ping.query_async(manager)).await;
    match reply {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(CacheError::from(e)),
        Err(_) => Err(CacheError::StoreUnavailable("PING timed out".to_string())),
    }
}
