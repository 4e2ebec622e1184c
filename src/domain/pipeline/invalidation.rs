//! Write-path cache invalidation
//!
//! Invalidation is explicit: every command declares the key prefixes it makes stale and
//! they are removed after the command has been persisted. There is no transactional
//! coupling with the write. A read that races the write can repopulate a stale entry,
//! which then lives until its own TTL lapses. Failed removals are logged and not retried.

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, error, warn};

use super::command::{CommandHandler, InvalidatesCache};
use crate::domain::DomainError;
use crate::domain::cache::{CacheContext, CacheStore};

/// Removes declared key prefixes from the cache
#[derive(Debug, Clone)]
pub struct CacheInvalidator {
    store: CacheStore,
}

impl CacheInvalidator {
    pub fn new(store: CacheStore) -> Self {
        Self { store }
    }

    /// Removes every prefix, returning the total number of entries removed
    ///
    /// Never fails: an unavailable backend counts as zero removals.
    pub async fn invalidate(&self, ctx: &CacheContext, prefixes: &[&str]) -> usize {
        let removals = prefixes
            .iter()
            .map(|prefix| async move { (*prefix, self.store.remove_by_prefix(ctx, prefix).await) });

        let mut total = 0;

        for (prefix, result) in join_all(removals).await {
            match result {
                Ok(count) => {
                    debug!(prefix = %prefix, count, "Invalidated cached reads");
                    total += count;
                }
                Err(e) if e.is_misuse() => {
                    error!(prefix = %prefix, error = %e, "Invalid cache prefix declared by command");
                }
                Err(e) => {
                    warn!(prefix = %prefix, error = %e, "Cache prefix invalidation failed");
                }
            }
        }

        total
    }
}

/// Command handler wrapper that invalidates cached reads after a successful write
#[derive(Debug)]
pub struct InvalidatingCommandHandler<H> {
    inner: H,
    invalidator: CacheInvalidator,
}

impl<H> InvalidatingCommandHandler<H> {
    pub fn new(inner: H, invalidator: CacheInvalidator) -> Self {
        Self { inner, invalidator }
    }
}

#[async_trait]
impl<C, H> CommandHandler<C> for InvalidatingCommandHandler<H>
where
    C: InvalidatesCache,
    H: CommandHandler<C>,
{
    async fn handle(&self, ctx: &CacheContext, command: C) -> Result<C::Output, DomainError> {
        let prefixes = command.invalidated_prefixes();
        let output = self.inner.handle(ctx, command).await?;

        // The write is committed; a cancelled caller must not skip invalidation.
        let detached = CacheContext::new();
        self.invalidator.invalidate(&detached, prefixes).await;

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockCacheBackend;
    use crate::domain::pipeline::Command;
    use crate::infrastructure::cache::LocalCache;
    use std::sync::Arc;

    struct RenameCategory {
        fail: bool,
    }

    impl Command for RenameCategory {
        type Output = &'static str;
    }

    impl InvalidatesCache for RenameCategory {
        fn invalidated_prefixes(&self) -> &'static [&'static str] {
            &["categories:", "dashboard:"]
        }
    }

    struct Persist;

    #[async_trait]
    impl CommandHandler<RenameCategory> for Persist {
        async fn handle(
            &self,
            _ctx: &CacheContext,
            command: RenameCategory,
        ) -> Result<&'static str, DomainError> {
            if command.fail {
                return Err(DomainError::conflict("category changed concurrently"));
            }
            Ok("renamed")
        }
    }

    async fn seeded_store() -> CacheStore {
        let store = CacheStore::new(Arc::new(LocalCache::new()));
        let ctx = CacheContext::new();

        for key in ["categories:all", "categories:id:9", "dashboard:stats", "products:1"] {
            store.set(&ctx, key, &key, None).await.unwrap();
        }

        store
    }

    #[tokio::test]
    async fn test_successful_write_removes_declared_prefixes() {
        let store = seeded_store().await;
        let handler = InvalidatingCommandHandler::new(Persist, CacheInvalidator::new(store.clone()));
        let ctx = CacheContext::new();

        let output = handler.handle(&ctx, RenameCategory { fail: false }).await.unwrap();
        assert_eq!(output, "renamed");

        assert!(store.get::<String>(&ctx, "categories:all").await.unwrap().is_none());
        assert!(store.get::<String>(&ctx, "categories:id:9").await.unwrap().is_none());
        assert!(store.get::<String>(&ctx, "dashboard:stats").await.unwrap().is_none());
        assert_eq!(
            store.get::<String>(&ctx, "products:1").await.unwrap(),
            Some("products:1".to_string())
        );
    }

    #[tokio::test]
    async fn test_failed_write_leaves_cache_untouched() {
        let store = seeded_store().await;
        let handler = InvalidatingCommandHandler::new(Persist, CacheInvalidator::new(store.clone()));
        let ctx = CacheContext::new();

        assert!(handler.handle(&ctx, RenameCategory { fail: true }).await.is_err());
        assert!(store.get::<String>(&ctx, "categories:all").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_write_succeeds_when_invalidation_backend_is_down() {
        let mut mock = MockCacheBackend::new();
        mock.expect_name().return_const("mock");
        mock.expect_remove_by_prefix()
            .times(2)
            .returning(|_| Err(DomainError::cache("connection reset")));

        let store = CacheStore::new(Arc::new(mock));
        let handler = InvalidatingCommandHandler::new(Persist, CacheInvalidator::new(store));

        let output = handler
            .handle(&CacheContext::new(), RenameCategory { fail: false })
            .await
            .unwrap();
        assert_eq!(output, "renamed");
    }

    #[tokio::test]
    async fn test_invalidate_reports_total_removed() {
        let store = seeded_store().await;
        let invalidator = CacheInvalidator::new(store);

        let removed = invalidator
            .invalidate(&CacheContext::new(), &["categories:", "products:"])
            .await;
        assert_eq!(removed, 3);
    }

    #[tokio::test]
    async fn test_invalid_prefix_does_not_block_the_others() {
        let store = seeded_store().await;
        let invalidator = CacheInvalidator::new(store.clone());
        let ctx = CacheContext::new();

        let removed = invalidator.invalidate(&ctx, &["", "dashboard:"]).await;

        assert_eq!(removed, 1);
        assert!(store.get::<String>(&ctx, "dashboard:stats").await.unwrap().is_none());
        assert!(store.get::<String>(&ctx, "categories:all").await.unwrap().is_some());
    }
}
