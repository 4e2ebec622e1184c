use std::time::Duration;

use serde::Deserialize;

use crate::domain::ExpirationPolicy;
use crate::infrastructure::observability::MetricsConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cache: CacheSettings,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Cache backend selection and expiration defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// `local` or `redis`
    pub backend: String,
    pub default_ttl_secs: u64,
    /// 0 disables the sliding window
    pub sliding_ttl_secs: u64,
    /// Upper bound for a single backend call
    pub operation_timeout_ms: u64,
    /// Total cache time allowed to one HTTP request
    pub request_budget_ms: u64,
    /// Local backend only
    pub max_capacity: u64,
    pub redis: RedisSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedisSettings {
    pub url: String,
    pub namespace: String,
    pub connection_timeout_ms: u64,
    pub scan_batch: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: "local".to_string(),
            default_ttl_secs: 300,
            sliding_ttl_secs: 120,
            operation_timeout_ms: 250,
            request_budget_ms: 1000,
            max_capacity: 10_000,
            redis: RedisSettings::default(),
        }
    }
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            namespace: "catalog".to_string(),
            connection_timeout_ms: 2000,
            scan_batch: 100,
        }
    }
}

impl CacheSettings {
    /// Policy applied to writes that do not specify one
    pub fn default_policy(&self) -> ExpirationPolicy {
        let policy = ExpirationPolicy::new(Duration::from_secs(self.default_ttl_secs));

        match self.sliding_ttl_secs {
            0 => policy,
            secs => policy.with_sliding(Duration::from_secs(secs)),
        }
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    pub fn request_budget(&self) -> Duration {
        Duration::from_millis(self.request_budget_ms)
    }
}

impl RedisSettings {
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
