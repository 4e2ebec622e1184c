//! Catalog Cache
//!
//! Product catalog service whose reads go through a cache-aside pipeline:
//! - Cacheable queries are served from a local (moka) or Redis cache
//! - Commands invalidate key prefixes after they succeed
//! - Cache failures degrade to misses and never fail a request

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use infrastructure::cache::CacheFactory;
use infrastructure::catalog::{CatalogService, InMemoryCategoryRepository, InMemoryProductRepository};
use tracing::info;

/// Create the application state from configuration
///
/// Builds the configured cache store without contacting it, so a Redis outage
/// at startup only degrades reads.
pub fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    if config.cache.request_budget_ms == 0 {
        anyhow::bail!("cache.request_budget_ms must be greater than zero");
    }

    let store = CacheFactory::new().create_store(&config.cache)?;

    let catalog = CatalogService::new(
        Arc::new(InMemoryProductRepository::new()),
        Arc::new(InMemoryCategoryRepository::new()),
        store,
    );

    info!(
        backend = catalog.store().backend_name(),
        budget_ms = config.cache.request_budget_ms,
        "Catalog service initialized"
    );

    Ok(AppState::new(Arc::new(catalog)).with_cache_budget(config.cache.request_budget()))
}
