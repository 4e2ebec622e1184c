//! Cache backend trait definition

use async_trait::async_trait;
use bytes::Bytes;

use super::entry::ExpirationPolicy;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Raw key-value operations over serialized payloads
///
/// Backends report failures as `DomainError::Cache`; turning those into misses and
/// logged no-ops is the job of [`super::CacheStore`], not of the backend.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short backend name used in logs and metric labels
    fn name(&self) -> &'static str;

    /// Gets a payload, `None` when absent or expired
    async fn get_raw(&self, key: &str) -> Result<Option<Bytes>, DomainError>;

    /// Stores a payload, replacing any previous entry for the key
    async fn set_raw(
        &self,
        key: &str,
        value: Bytes,
        policy: ExpirationPolicy,
    ) -> Result<(), DomainError>;

    /// Removes a key, returning whether a live entry was removed
    async fn remove(&self, key: &str) -> Result<bool, DomainError>;

    /// Removes every live key starting with `prefix`, returning the count
    async fn remove_by_prefix(&self, prefix: &str) -> Result<usize, DomainError>;

    /// Checks that the backend is reachable
    async fn ping(&self) -> Result<(), DomainError>;
}
