//! Cache-aside decorator for query handlers

use async_trait::async_trait;
use tracing::debug;

use super::query::{CacheableQuery, QueryHandler};
use crate::domain::DomainError;
use crate::domain::cache::{CacheContext, CacheStore};

/// Query handler wrapper that serves results from the cache
///
/// On a hit the inner handler is not called. On a miss the inner handler runs and its
/// result is stored under the query's key before being returned. Errors from the inner
/// handler are never cached.
#[derive(Debug)]
pub struct CachingQueryHandler<H> {
    inner: H,
    store: CacheStore,
}

impl<H> CachingQueryHandler<H> {
    pub fn new(inner: H, store: CacheStore) -> Self {
        Self { inner, store }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

#[async_trait]
impl<Q, H> QueryHandler<Q> for CachingQueryHandler<H>
where
    Q: CacheableQuery,
    H: QueryHandler<Q>,
{
    async fn handle(&self, ctx: &CacheContext, query: Q) -> Result<Q::Output, DomainError> {
        let key = query.cache_key();
        let expiration = query.cache_expiration();

        if let Some(cached) = self.store.get::<Q::Output>(ctx, &key).await? {
            return Ok(cached);
        }

        debug!(key = %key, "Executing query after cache miss");
        let result = self.inner.handle(ctx, query).await?;
        self.store.set(ctx, &key, &result, expiration).await?;

        Ok(result)
    }
}
