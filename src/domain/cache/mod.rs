//! Cache domain - backend abstraction, fail-open store and key conventions

mod backend;
mod context;
mod entry;
mod key;
mod store;

pub use backend::CacheBackend;
pub use context::{CacheContext, Interrupted};
pub use entry::{CacheEntry, ExpirationPolicy};
pub use key::{CacheKeyBuilder, KEY_SEPARATOR, MAX_KEY_LENGTH, validate_key, validate_prefix};
pub use store::{CacheStore, DEFAULT_OPERATION_TIMEOUT};

#[cfg(test)]
pub use backend::MockCacheBackend;
