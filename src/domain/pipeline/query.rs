//! Read-side request and handler traits

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::domain::DomainError;
use crate::domain::cache::{CacheContext, ExpirationPolicy};

/// A read request producing a serializable result
pub trait Query: Send + Sync + 'static {
    type Output: Serialize + DeserializeOwned + Send + Sync;
}

/// A query whose result may be served from the cache
///
/// Only types implementing this trait can go through
/// [`super::CachingQueryHandler`]; wrapping any other handler is a compile error.
pub trait CacheableQuery: Query {
    /// Key under which the result is cached
    fn cache_key(&self) -> String;

    /// Expiration for the cached result, `None` for the store default
    fn cache_expiration(&self) -> Option<ExpirationPolicy> {
        None
    }
}

/// Executes a query against the source of truth
#[async_trait]
pub trait QueryHandler<Q: Query>: Send + Sync {
    async fn handle(&self, ctx: &CacheContext, query: Q) -> Result<Q::Output, DomainError>;
}

#[async_trait]
impl<Q, H> QueryHandler<Q> for Arc<H>
where
    Q: Query,
    H: QueryHandler<Q> + ?Sized,
{
    async fn handle(&self, ctx: &CacheContext, query: Q) -> Result<Q::Output, DomainError> {
        (**self).handle(ctx, query).await
    }
}
