//! Redis cache backend
//!
//! Each logical entry is a hash at `"<namespace>:<key>"`:
//!
//! - `data`: the serialized payload
//! - `absexp`: absolute expiry as unix milliseconds
//! - `sldexp`: sliding window in milliseconds, `-1` when disabled
//!
//! The key's own TTL is the lifetime granted by the last write or read, so Redis drops
//! idle entries by itself. Reads of sliding entries push the TTL forward, never past
//! `absexp`.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::domain::DomainError;
use crate::domain::cache::{CacheBackend, ExpirationPolicy, KEY_SEPARATOR};

const FIELD_DATA: &str = "data";
const FIELD_ABSOLUTE: &str = "absexp";
const FIELD_SLIDING: &str = "sldexp";
const NO_SLIDING: i64 = -1;

/// Configuration for Redis cache
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Namespace prepended to every physical key
    pub namespace: String,
    /// Upper bound for establishing the connection
    pub connection_timeout: Duration,
    /// COUNT hint for each SCAN page during prefix removal
    pub scan_batch: usize,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            namespace: "catalog".to_string(),
            connection_timeout: Duration::from_secs(2),
            scan_batch: 100,
        }
    }
}

impl RedisCacheConfig {
    /// Creates a new configuration with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    pub fn with_scan_batch(mut self, batch: usize) -> Self {
        self.scan_batch = batch.max(1);
        self
    }
}

/// Shared, cross-process cache backend
///
/// The connection is opened on first use. If that fails the next operation tries again;
/// once open, `ConnectionManager` reconnects on its own.
pub struct RedisCache {
    client: Client,
    connection: OnceCell<ConnectionManager>,
    config: RedisCacheConfig,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("config", &self.config)
            .field("connected", &self.connection.initialized())
            .finish()
    }
}

impl RedisCache {
    /// Creates a backend without connecting; only the URL is checked here
    pub fn new(config: RedisCacheConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str()).map_err(|e| {
            DomainError::configuration(format!("Invalid Redis URL '{}': {}", config.url, e))
        })?;

        if config.namespace.is_empty() {
            return Err(DomainError::configuration("Redis namespace must not be empty"));
        }

        Ok(Self {
            client,
            connection: OnceCell::new(),
            config,
        })
    }

    pub fn config(&self) -> &RedisCacheConfig {
        &self.config
    }

    async fn connection(&self) -> Result<ConnectionManager, DomainError> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                let connect = ConnectionManager::new(self.client.clone());

                let manager = tokio::time::timeout(self.config.connection_timeout, connect)
                    .await
                    .map_err(|_| {
                        DomainError::cache(format!(
                            "Timed out connecting to Redis after {:?}",
                            self.config.connection_timeout
                        ))
                    })?
                    .map_err(|e| DomainError::cache(format!("Failed to connect to Redis: {}", e)))?;

                info!(namespace = %self.config.namespace, "Connected to Redis cache");
                Ok::<_, DomainError>(manager)
            })
            .await?;

        Ok(manager.clone())
    }

    fn physical_key(&self, key: &str) -> String {
        format!("{}{}{}", self.config.namespace, KEY_SEPARATOR, key)
    }

    /// Maps a physical key from SCAN back to its logical key
    fn logical_key<'a>(&self, physical: &'a str) -> Option<&'a str> {
        physical
            .strip_prefix(self.config.namespace.as_str())
            .and_then(|rest| rest.strip_prefix(KEY_SEPARATOR))
    }

    fn scan_pattern(&self, prefix: &str) -> String {
        format!(
            "{}{}{}*",
            escape_glob(&self.config.namespace),
            KEY_SEPARATOR,
            escape_glob(prefix)
        )
    }
}

/// Escapes the characters SCAN MATCH treats as glob syntax
fn escape_glob(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());

    for c in raw.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}

fn millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// TTL to grant an entry read at `now_ms`; `None` once the absolute expiry has passed
fn renewed_lifetime(now_ms: i64, absolute_ms: i64, sliding_ms: i64) -> Option<i64> {
    let remaining = absolute_ms - now_ms;

    if remaining <= 0 {
        return None;
    }

    if sliding_ms > 0 {
        Some(sliding_ms.min(remaining))
    } else {
        Some(remaining)
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get_raw(&self, key: &str) -> Result<Option<Bytes>, DomainError> {
        let physical = self.physical_key(key);
        let mut conn = self.connection().await?;

        let (data, absolute, sliding): (Option<Vec<u8>>, Option<i64>, Option<i64>) = conn
            .hget(&physical, &[FIELD_DATA, FIELD_ABSOLUTE, FIELD_SLIDING])
            .await
            .map_err(|e| DomainError::cache(format!("Failed to get key '{}': {}", key, e)))?;

        let (Some(data), Some(absolute)) = (data, absolute) else {
            return Ok(None);
        };
        let sliding = sliding.unwrap_or(NO_SLIDING);

        let Some(lifetime) = renewed_lifetime(Utc::now().timestamp_millis(), absolute, sliding)
        else {
            return Ok(None);
        };

        if sliding > 0 {
            let _: bool = conn.pexpire(&physical, lifetime).await.map_err(|e| {
                DomainError::cache(format!("Failed to renew TTL for key '{}': {}", key, e))
            })?;
        }

        Ok(Some(Bytes::from(data)))
    }

    async fn set_raw(
        &self,
        key: &str,
        value: Bytes,
        policy: ExpirationPolicy,
    ) -> Result<(), DomainError> {
        let physical = self.physical_key(key);
        let mut conn = self.connection().await?;

        let absolute = Utc::now().timestamp_millis() + millis(policy.absolute());
        let sliding = policy.sliding().map(millis).unwrap_or(NO_SLIDING);
        let lifetime = millis(policy.initial_lifetime()).max(1);

        // Replace, not merge: a stale sldexp must not survive an overwrite.
        let _: () = redis::pipe()
            .atomic()
            .del(&physical)
            .ignore()
            .hset_multiple(
                &physical,
                &[
                    (FIELD_DATA, value.to_vec()),
                    (FIELD_ABSOLUTE, absolute.to_string().into_bytes()),
                    (FIELD_SLIDING, sliding.to_string().into_bytes()),
                ],
            )
            .ignore()
            .pexpire(&physical, lifetime)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to set key '{}': {}", key, e)))?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, DomainError> {
        let physical = self.physical_key(key);
        let mut conn = self.connection().await?;

        let deleted: i64 = conn
            .del(&physical)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to delete key '{}': {}", key, e)))?;

        Ok(deleted > 0)
    }

    async fn remove_by_prefix(&self, prefix: &str) -> Result<usize, DomainError> {
        let pattern = self.scan_pattern(prefix);
        let mut conn = self.connection().await?;

        // SCAN instead of KEYS so a large keyspace never blocks the server
        let mut cursor = 0u64;
        let mut removed = 0usize;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(self.config.scan_batch)
                .query_async(&mut conn)
                .await
                .map_err(|e| {
                    DomainError::cache(format!(
                        "Failed to scan keys with prefix '{}': {}",
                        prefix, e
                    ))
                })?;

            for physical in &keys {
                let Some(logical) = self.logical_key(physical) else {
                    continue;
                };

                if self.remove(logical).await? {
                    removed += 1;
                }
            }

            cursor = next_cursor;

            if cursor == 0 {
                break;
            }
        }

        debug!(prefix = %prefix, removed, "Redis prefix scan complete");
        Ok(removed)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        let mut conn = self.connection().await?;

        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::cache(format!("Redis ping failed: {}", e)))?;

        Ok(())
    }
}
