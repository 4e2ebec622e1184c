//! Invalidate command - flushes a key prefix from the configured cache

use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::cache::{CacheContext, CacheStore};
use crate::infrastructure::cache::CacheFactory;
use crate::infrastructure::logging::init_logging;

#[derive(Debug, Args)]
pub struct InvalidateArgs {
    /// Key prefix to remove, e.g. `products:`
    pub prefix: String,
}

/// Remove cached entries under `args.prefix` and print how many were dropped
///
/// Only meaningful against a shared backend; a local cache lives in the
/// server process and this command starts with an empty one.
pub async fn run(args: InvalidateArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging);

    let store = CacheFactory::new().create_store(&config.cache)?;
    let removed = flush(&store, &args.prefix).await?;

    info!(prefix = %args.prefix, removed, backend = store.backend_name(), "Prefix invalidated");
    println!("{}", removed);

    Ok(())
}

async fn flush(store: &CacheStore, prefix: &str) -> anyhow::Result<usize> {
    let ctx = CacheContext::new();

    if !store.ping(&ctx).await {
        anyhow::bail!("cache backend '{}' is unreachable", store.backend_name());
    }

    Ok(store.remove_by_prefix(&ctx, prefix).await?)
}
