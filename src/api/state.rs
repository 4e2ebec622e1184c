//! Application state shared by the HTTP handlers

use std::sync::Arc;
use std::time::Duration;

use crate::domain::CacheContext;
use crate::infrastructure::catalog::CatalogService;

/// Default cache budget for a single request
pub const DEFAULT_CACHE_BUDGET: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    /// Total time a request may spend in cache calls before they degrade to misses
    pub cache_budget: Duration,
}

impl AppState {
    pub fn new(catalog: Arc<CatalogService>) -> Self {
        Self {
            catalog,
            cache_budget: DEFAULT_CACHE_BUDGET,
        }
    }

    pub fn with_cache_budget(mut self, budget: Duration) -> Self {
        self.cache_budget = budget;
        self
    }

    /// Context for the cache calls of one request
    pub fn cache_context(&self) -> CacheContext {
        CacheContext::new().with_timeout(self.cache_budget)
    }
}
