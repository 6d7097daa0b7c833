//! `CacheStore` implementation over Redis.
//!
//! Wire protocol: `GET key`, `SET key value EX ttl`, and prefix deletion as
//! `SCAN cursor MATCH prefix* COUNT n` pages followed by `DEL` per page.
//! The connection is established lazily on first use so a store that is down
//! at startup only degrades caching instead of failing construction.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, RedisResult};
use std::future::Future;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::timeout;
use tracing::debug;

use super::connection::{connect, open_client, ConnectionSettings};
use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::models::StoreConfig;
use crate::domain::ports::CacheStore;

/// Redis cache store sharing one multiplexed connection across callers.
pub struct RedisCacheStore {
    client: Client,
    connection: OnceCell<ConnectionManager>,
    settings: ConnectionSettings,
}

impl RedisCacheStore {
    pub fn new(client: Client, settings: ConnectionSettings) -> Self {
        Self {
            client,
            connection: OnceCell::new(),
            settings,
        }
    }

    /// Build a store from configuration without connecting.
    pub fn from_config(config: &StoreConfig) -> CacheResult<Self> {
        Ok(Self::new(open_client(config)?, ConnectionSettings::from(config)))
    }

    /// Connect now and PING, surfacing any connection or auth problem.
    pub async fn verify(&self) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        super::connection::verify_connection(&mut conn, self.settings.operation_timeout).await
    }

    async fn connection(&self) -> CacheResult<ConnectionManager> {
        let manager = self
            .connection
            .get_or_try_init(|| connect(&self.client, self.settings.connect_timeout))
            .await?;
        Ok(manager.clone())
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> CacheResult<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match timeout(self.settings.operation_timeout, fut).await {
            Ok(result) => result.map_err(|e| CacheError::StoreUnavailable(format!("{op} failed: {e}"))),
            Err(_) => Err(CacheError::StoreUnavailable(format!(
                "{op} timed out after {}ms",
                self.settings.operation_timeout.as_millis()
            ))),
        }
    }
}

/// Escape glob metacharacters so a prefix matches literally in `SCAN MATCH`.
fn escape_glob(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);
        let value: Option<Vec<u8>> = self.bounded("GET", cmd.query_async(&mut conn)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()> {
        let ttl_seconds = ttl.as_secs();
        if ttl_seconds == 0 {
            return Err(CacheError::InvalidConfiguration(
                "refusing to store an entry without a whole-second expiry".to_string(),
            ));
        }

        let mut conn = self.connection().await?;
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value).arg("EX").arg(ttl_seconds);
        let (): () = self.bounded("SET", cmd.query_async(&mut conn)).await?;
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> CacheResult<u64> {
        let mut conn = self.connection().await?;
        let pattern = format!("{}*", escape_glob(prefix));
        let mut cursor: u64 = 0;
        let mut removed: u64 = 0;

        loop {
            let mut scan = redis::cmd("SCAN");
            scan.arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(self.settings.scan_batch_size);
            let (next, keys): (u64, Vec<Vec<u8>>) =
                self.bounded("SCAN", scan.query_async(&mut conn)).await?;

            if !keys.is_empty() {
                let mut del = redis::cmd("DEL");
                del.arg(&keys);
                let deleted: u64 = self.bounded("DEL", del.query_async(&mut conn)).await?;
                removed += deleted;
                debug!(pattern = %pattern, page = keys.len(), deleted, "deleted key page");
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(removed)
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_store() -> RedisCacheStore {
        RedisCacheStore::from_config(&StoreConfig {
            url: "redis://127.0.0.1:1/0".to_string(),
            connect_timeout_ms: 200,
            operation_timeout_ms: 200,
            ..StoreConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_escape_glob() {
        assert_eq!(escape_glob("aiagent:summarizer:"), "aiagent:summarizer:");
        assert_eq!(escape_glob("a*b?[c]\\"), "a\\*b\\?\\[c\\]\\\\");
    }

    #[tokio::test]
    async fn test_unreachable_store_reports_unavailable() {
        let store = unreachable_store();
        assert!(matches!(
            store.get("aiagent:a:v1:00").await,
            Err(CacheError::StoreUnavailable(_))
        ));
        assert!(matches!(
            store.delete_prefix("aiagent:a:").await,
            Err(CacheError::StoreUnavailable(_))
        ));
        assert!(matches!(
            store.verify().await,
            Err(CacheError::StoreUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_zero_ttl_rejected_before_connecting() {
        let store = unreachable_store();
        let result = store.set("k", b"v", Duration::from_millis(500)).await;
        assert!(matches!(result, Err(CacheError::InvalidConfiguration(_))));
    }

    #[tokio::test]
    async fn test_silent_store_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        // Accept connections and keep them open without ever replying.
        let silent = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let store = RedisCacheStore::from_config(&StoreConfig {
            url: format!("redis://127.0.0.1:{port}/0"),
            connect_timeout_ms: 300,
            operation_timeout_ms: 300,
            ..StoreConfig::default()
        })
        .unwrap();

        let started = std::time::Instant::now();
        let get = store.get("aiagent:a:v1:00").await;
        let elapsed = started.elapsed();
        assert!(matches!(get, Err(CacheError::StoreUnavailable(_))), "got {get:?}");
        assert!(elapsed >= Duration::from_millis(250), "returned after {elapsed:?}");
        assert!(elapsed < Duration::from_secs(3), "returned after {elapsed:?}");

        let set = store.set("aiagent:a:v1:00", b"v", Duration::from_secs(60)).await;
        assert!(matches!(set, Err(CacheError::StoreUnavailable(_))), "got {set:?}");

        silent.abort();
    }
}
