//! Cache factory for runtime backend selection

use std::sync::Arc;

use tracing::info;

use crate::config::CacheSettings;
use crate::domain::DomainError;
use crate::domain::cache::{CacheBackend, CacheStore};

use super::local::{LocalCache, LocalCacheConfig};
use super::redis::{RedisCache, RedisCacheConfig};

/// Supported cache backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheBackendType {
    /// In-process moka cache
    #[default]
    Local,
    /// Shared Redis cache
    Redis,
}

impl std::fmt::Display for CacheBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackendType::Local => write!(f, "local"),
            CacheBackendType::Redis => write!(f, "redis"),
        }
    }
}

impl std::str::FromStr for CacheBackendType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "in_memory" | "memory" => Ok(CacheBackendType::Local),
            "redis" => Ok(CacheBackendType::Redis),
            _ => Err(DomainError::configuration(format!(
                "Unknown cache backend: {}. Valid backends: local, redis",
                s
            ))),
        }
    }
}

/// Builds cache backends and stores from configuration
#[derive(Debug, Default)]
pub struct CacheFactory;

impl CacheFactory {
    pub fn new() -> Self {
        Self
    }

    /// Creates the configured backend
    ///
    /// Does not contact Redis; an unreachable server only degrades later operations.
    pub fn create_backend(
        &self,
        settings: &CacheSettings,
    ) -> Result<Arc<dyn CacheBackend>, DomainError> {
        let backend_type: CacheBackendType = settings.backend.parse()?;

        let backend: Arc<dyn CacheBackend> = match backend_type {
            CacheBackendType::Local => Arc::new(LocalCache::with_config(
                LocalCacheConfig::default().with_max_capacity(settings.max_capacity),
            )),
            CacheBackendType::Redis => {
                let config = RedisCacheConfig::new(settings.redis.url.clone())
                    .with_namespace(settings.redis.namespace.clone())
                    .with_connection_timeout(settings.redis.connection_timeout())
                    .with_scan_batch(settings.redis.scan_batch);

                Arc::new(RedisCache::new(config)?)
            }
        };

        info!(backend = %backend_type, "Cache backend created");
        Ok(backend)
    }

    /// Creates a fail-open store over the configured backend
    pub fn create_store(&self, settings: &CacheSettings) -> Result<CacheStore, DomainError> {
        let policy = settings.default_policy();
        policy.validate().map_err(|e| {
            DomainError::configuration(format!("Invalid cache expiration defaults: {}", e))
        })?;

        if settings.operation_timeout_ms == 0 {
            return Err(DomainError::configuration(
                "Cache operation timeout must be greater than zero",
            ));
        }

        let store = CacheStore::new(self.create_backend(settings)?)
            .with_default_policy(policy)
            .with_operation_timeout(settings.operation_timeout());

        Ok(store)
    }
}
