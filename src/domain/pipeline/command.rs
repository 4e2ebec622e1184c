//! Write-side request and handler traits

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::DomainError;
use crate::domain::cache::CacheContext;

/// A request that mutates the source of truth
pub trait Command: Send + Sync + 'static {
    type Output: Send;
}

/// A command that makes cached reads stale
///
/// Each prefix names one entity collection (e.g. `products:`). They are removed only
/// after the command has been persisted successfully.
pub trait InvalidatesCache: Command {
    fn invalidated_prefixes(&self) -> &'static [&'static str];
}

/// Executes a command against the source of truth
#[async_trait]
pub trait CommandHandler<C: Command>: Send + Sync {
    async fn handle(&self, ctx: &CacheContext, command: C) -> Result<C::Output, DomainError>;
}

#[async_trait]
impl<C, H> CommandHandler<C> for Arc<H>
where
    C: Command,
    H: CommandHandler<C> + ?Sized,
{
    async fn handle(&self, ctx: &CacheContext, command: C) -> Result<C::Output, DomainError> {
        (**self).handle(ctx, command).await
    }
}
