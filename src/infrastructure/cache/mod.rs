//! Cache infrastructure - backend implementations

mod factory;
mod local;
mod redis;

pub use factory::{CacheBackendType, CacheFactory};
pub use local::{LocalCache, LocalCacheConfig};
pub use redis::{RedisCache, RedisCacheConfig};
