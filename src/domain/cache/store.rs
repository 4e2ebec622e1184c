//! Typed, fail-open cache store
//!
//! `CacheStore` is what the rest of the application talks to. It validates arguments,
//! serializes values as JSON, bounds every backend call by the caller's context, and
//! swallows backend failures: reads degrade to a miss and writes become logged no-ops.
//! The only errors it returns are `DomainError::Validation` for caller misuse.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use metrics::counter;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::backend::CacheBackend;
use super::context::CacheContext;
use super::entry::ExpirationPolicy;
use super::key::{validate_key, validate_prefix};
use crate::domain::DomainError;

/// Default upper bound for a single backend call
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy)]
enum Operation {
    Get,
    Set,
    Remove,
    RemoveByPrefix,
    Ping,
}

impl Operation {
    fn as_str(&self) -> &'static str {
        match self {
            Operation::Get => "get",
            Operation::Set => "set",
            Operation::Remove => "remove",
            Operation::RemoveByPrefix => "remove_by_prefix",
            Operation::Ping => "ping",
        }
    }
}

/// Fail-open facade over a [`CacheBackend`]
#[derive(Clone)]
pub struct CacheStore {
    backend: Arc<dyn CacheBackend>,
    default_policy: ExpirationPolicy,
    operation_timeout: Duration,
}

impl fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("backend", &self.backend.name())
            .field("default_policy", &self.default_policy)
            .field("operation_timeout", &self.operation_timeout)
            .finish()
    }
}

impl CacheStore {
    /// Creates a store with the default policy (5 min absolute, 2 min sliding)
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend,
            default_policy: ExpirationPolicy::default(),
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Sets the policy used when a caller passes none
    pub fn with_default_policy(mut self, policy: ExpirationPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    /// Sets the upper bound for a single backend call
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn default_policy(&self) -> ExpirationPolicy {
        self.default_policy
    }

    /// Gets a typed value; misses, expired entries and degraded reads all yield `None`
    pub async fn get<T>(&self, ctx: &CacheContext, key: &str) -> Result<Option<T>, DomainError>
    where
        T: DeserializeOwned,
    {
        validate_key(key)?;

        let Some(found) = self
            .call(ctx, Operation::Get, key, self.backend.get_raw(key))
            .await
        else {
            return Ok(None);
        };

        let Some(raw) = found else {
            debug!(backend = self.backend.name(), key = %key, "Cache miss");
            self.record(Operation::Get, "miss");
            return Ok(None);
        };

        match serde_json::from_slice::<T>(&raw) {
            Ok(value) => {
                debug!(backend = self.backend.name(), key = %key, "Cache hit");
                self.record(Operation::Get, "hit");
                Ok(Some(value))
            }
            Err(e) => {
                warn!(
                    backend = self.backend.name(),
                    key = %key,
                    error = %e,
                    "Discarding cached value that failed to deserialize"
                );
                self.record(Operation::Get, "decode_error");
                self.call(ctx, Operation::Remove, key, self.backend.remove(key))
                    .await;
                Ok(None)
            }
        }
    }

    /// Stores a typed value; `None` uses the default policy
    pub async fn set<T>(
        &self,
        ctx: &CacheContext,
        key: &str,
        value: &T,
        policy: Option<ExpirationPolicy>,
    ) -> Result<(), DomainError>
    where
        T: Serialize + ?Sized,
    {
        validate_key(key)?;
        let policy = self.resolve_policy(policy)?;

        let payload = match serde_json::to_vec(value) {
            Ok(payload) => Bytes::from(payload),
            Err(e) => {
                warn!(
                    backend = self.backend.name(),
                    key = %key,
                    error = %e,
                    "Skipping cache write for value that failed to serialize"
                );
                self.record(Operation::Set, "encode_error");
                return Ok(());
            }
        };

        if self
            .call(ctx, Operation::Set, key, self.backend.set_raw(key, payload, policy))
            .await
            .is_some()
        {
            debug!(
                backend = self.backend.name(),
                key = %key,
                ttl_secs = policy.absolute().as_secs(),
                "Cache set"
            );
            self.record(Operation::Set, "stored");
        }

        Ok(())
    }

    /// Removes a key; removing an absent key is not an error
    pub async fn remove(&self, ctx: &CacheContext, key: &str) -> Result<(), DomainError> {
        validate_key(key)?;

        if let Some(removed) = self
            .call(ctx, Operation::Remove, key, self.backend.remove(key))
            .await
        {
            debug!(backend = self.backend.name(), key = %key, removed, "Cache remove");
            self.record(Operation::Remove, if removed { "removed" } else { "absent" });
        }

        Ok(())
    }

    /// Removes every live key starting with `prefix` and returns how many were removed
    ///
    /// A degraded backend reports 0.
    pub async fn remove_by_prefix(
        &self,
        ctx: &CacheContext,
        prefix: &str,
    ) -> Result<usize, DomainError> {
        validate_prefix(prefix)?;

        let removed = self
            .call(
                ctx,
                Operation::RemoveByPrefix,
                prefix,
                self.backend.remove_by_prefix(prefix),
            )
            .await;

        if let Some(count) = removed {
            debug!(backend = self.backend.name(), prefix = %prefix, count, "Cache prefix removal");
            self.record(Operation::RemoveByPrefix, "removed");
        }

        Ok(removed.unwrap_or(0))
    }

    /// Returns the cached value or computes, stores and returns it
    ///
    /// `factory` runs at most once per call. Concurrent callers missing on the same key
    /// may each run their own factory; there is no single-flight de-duplication. A
    /// factory error is returned as is and nothing is stored.
    pub async fn get_or_create<T, E, F, Fut>(
        &self,
        ctx: &CacheContext,
        key: &str,
        policy: Option<ExpirationPolicy>,
        factory: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<DomainError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let policy = self.resolve_policy(policy)?;

        if let Some(cached) = self.get::<T>(ctx, key).await? {
            return Ok(cached);
        }

        let value = factory().await?;
        self.set(ctx, key, &value, Some(policy)).await?;

        Ok(value)
    }

    /// Reports whether the backend currently answers
    pub async fn ping(&self, ctx: &CacheContext) -> bool {
        self.call(ctx, Operation::Ping, "-", self.backend.ping())
            .await
            .is_some()
    }

    fn resolve_policy(&self, policy: Option<ExpirationPolicy>) -> Result<ExpirationPolicy, DomainError> {
        let policy = policy.unwrap_or(self.default_policy);
        policy.validate()?;
        Ok(policy)
    }

    /// Runs a backend call under the context budget, logging and absorbing failures
    async fn call<T, F>(
        &self,
        ctx: &CacheContext,
        operation: Operation,
        key: &str,
        fut: F,
    ) -> Option<T>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        let failure = match ctx.run(self.operation_timeout, fut).await {
            Ok(Ok(value)) => return Some(value),
            Ok(Err(e)) => e.to_string(),
            Err(interrupted) => interrupted.to_string(),
        };

        warn!(
            backend = self.backend.name(),
            operation = operation.as_str(),
            key = %key,
            error = %failure,
            "Cache backend unavailable, continuing without cache"
        );
        self.record(operation, "degraded");

        None
    }

    fn record(&self, operation: Operation, outcome: &'static str) {
        counter!(
            "cache_operations_total",
            "backend" => self.backend.name(),
            "operation" => operation.as_str(),
            "outcome" => outcome
        )
        .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::backend::MockCacheBackend;
    use async_trait::async_trait;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Product {
        id: String,
        name: String,
    }

    fn unavailable_backend() -> MockCacheBackend {
        let mut mock = MockCacheBackend::new();
        mock.expect_name().return_const("mock");
        mock.expect_get_raw()
            .returning(|_| Err(DomainError::cache("connection refused")));
        mock.expect_set_raw()
            .returning(|_, _, _| Err(DomainError::cache("connection refused")));
        mock.expect_remove()
            .returning(|_| Err(DomainError::cache("connection refused")));
        mock.expect_remove_by_prefix()
            .returning(|_| Err(DomainError::cache("connection refused")));
        mock.expect_ping()
            .returning(|| Err(DomainError::cache("connection refused")));
        mock
    }

    /// Backend that never answers within any reasonable budget
    struct HangingBackend;

    #[async_trait]
    impl CacheBackend for HangingBackend {
        fn name(&self) -> &'static str {
            "hanging"
        }

        async fn get_raw(&self, _key: &str) -> Result<Option<Bytes>, DomainError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Some(Bytes::from_static(b"\"late\"")))
        }

        async fn set_raw(
            &self,
            _key: &str,
            _value: Bytes,
            _policy: ExpirationPolicy,
        ) -> Result<(), DomainError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        }

        async fn remove(&self, _key: &str) -> Result<bool, DomainError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(true)
        }

        async fn remove_by_prefix(&self, _prefix: &str) -> Result<usize, DomainError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(1)
        }

        async fn ping(&self) -> Result<(), DomainError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_get_hit_deserializes_payload() {
        let mut mock = MockCacheBackend::new();
        mock.expect_name().return_const("mock");
        mock.expect_get_raw()
            .withf(|key| key.to_string() == "products:1")
            .returning(|_| Ok(Some(Bytes::from_static(br#"{"id":"1","name":"Widget"}"#))));

        let store = CacheStore::new(Arc::new(mock));
        let result: Option<Product> = store.get(&CacheContext::new(), "products:1").await.unwrap();

        assert_eq!(
            result,
            Some(Product {
                id: "1".to_string(),
                name: "Widget".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_set_serializes_json_with_default_policy() {
        let mut mock = MockCacheBackend::new();
        mock.expect_name().return_const("mock");
        mock.expect_set_raw()
            .withf(|key, value, policy| {
                key.to_string() == "categories:all"
                    && value[..] == br#"["a","b"]"#[..]
                    && *policy == ExpirationPolicy::default()
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let store = CacheStore::new(Arc::new(mock));
        store
            .set(&CacheContext::new(), "categories:all", &vec!["a", "b"], None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unavailable_backend_fails_open() {
        let store = CacheStore::new(Arc::new(unavailable_backend()));
        let ctx = CacheContext::new();

        let read: Option<Product> = store.get(&ctx, "products:1").await.unwrap();
        assert!(read.is_none());

        store.set(&ctx, "products:1", &"x", None).await.unwrap();
        store.remove(&ctx, "products:1").await.unwrap();
        assert_eq!(store.remove_by_prefix(&ctx, "products:").await.unwrap(), 0);
        assert!(!store.ping(&ctx).await);
    }

    #[tokio::test]
    async fn test_get_or_create_falls_through_when_backend_unavailable() {
        let store = CacheStore::new(Arc::new(unavailable_backend()));
        let calls = AtomicUsize::new(0);

        let value: Result<String, DomainError> = store
            .get_or_create(&CacheContext::new(), "products:1", None, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("fresh".to_string())
            })
            .await;

        assert_eq!(value.unwrap(), "fresh");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_undecodable_payload_is_a_miss_and_removed() {
        let mut mock = MockCacheBackend::new();
        mock.expect_name().return_const("mock");
        mock.expect_get_raw()
            .returning(|_| Ok(Some(Bytes::from_static(b"{\"unexpected\":true}"))));
        mock.expect_remove()
            .withf(|key| key.to_string() == "products:1")
            .times(1)
            .returning(|_| Ok(true));

        let store = CacheStore::new(Arc::new(mock));
        let result: Option<Product> = store.get(&CacheContext::new(), "products:1").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_misuse_fails_fast_without_touching_backend() {
        let mut mock = MockCacheBackend::new();
        mock.expect_name().return_const("mock");
        mock.expect_get_raw().never();
        mock.expect_set_raw().never();
        mock.expect_remove_by_prefix().never();

        let store = CacheStore::new(Arc::new(mock));
        let ctx = CacheContext::new();

        let err = store.get::<String>(&ctx, "").await.unwrap_err();
        assert!(err.is_misuse());

        let zero_ttl = ExpirationPolicy::new(Duration::ZERO);
        let err = store
            .set(&ctx, "products:1", &"x", Some(zero_ttl))
            .await
            .unwrap_err();
        assert!(err.is_misuse());

        let err = store.remove_by_prefix(&ctx, "").await.unwrap_err();
        assert!(err.is_misuse());
    }

    #[tokio::test]
    async fn test_get_or_create_rejects_bad_policy_before_running_factory() {
        let mut mock = MockCacheBackend::new();
        mock.expect_name().return_const("mock");
        let store = CacheStore::new(Arc::new(mock));

        let result: Result<String, DomainError> = store
            .get_or_create(
                &CacheContext::new(),
                "products:1",
                Some(ExpirationPolicy::new(Duration::ZERO)),
                || async { Err(DomainError::storage("factory must not run")) },
            )
            .await;

        assert!(result.unwrap_err().is_misuse());
    }

    #[tokio::test]
    async fn test_hanging_backend_is_bounded_by_operation_timeout() {
        let store = CacheStore::new(Arc::new(HangingBackend))
            .with_operation_timeout(Duration::from_millis(20));
        let ctx = CacheContext::new();

        let started = std::time::Instant::now();
        let read: Option<String> = store.get(&ctx, "products:1").await.unwrap();
        let removed = store.remove_by_prefix(&ctx, "products:").await.unwrap();

        assert!(read.is_none());
        assert_eq!(removed, 0);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_caller_cancellation_degrades_to_miss() {
        let token = tokio_util::sync::CancellationToken::new();
        token.cancel();

        let store = CacheStore::new(Arc::new(HangingBackend))
            .with_operation_timeout(Duration::from_secs(60));
        let ctx = CacheContext::new().with_cancellation(token);

        let read: Option<String> = store.get(&ctx, "products:1").await.unwrap();
        assert!(read.is_none());
    }
}
