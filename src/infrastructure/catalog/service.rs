//! Catalog service - the single entry point for catalog reads and writes

use std::sync::Arc;

use tracing::info;

use crate::domain::DomainError;
use crate::domain::cache::{CacheContext, CacheStore, validate_prefix};
use crate::domain::catalog::{
    Category, CategoryId, CategoryRepository, CreateCategory, CreateProduct, DashboardStats,
    DeleteCategory, DeleteProduct, GetCategory, GetDashboardStats, GetProduct, ListCategories,
    ListProducts, Page, PageRequest, Product, ProductId, ProductRepository, SearchProducts,
    UpdateCategory, UpdateProduct,
};
use crate::domain::pipeline::{
    CacheInvalidator, CachingQueryHandler, CommandHandler, InvalidatingCommandHandler,
    QueryHandler,
};

use super::handlers::{CatalogCommandHandler, CatalogQueryHandler};

/// Catalog reads go through the cache, writes invalidate it
#[derive(Debug)]
pub struct CatalogService {
    queries: CachingQueryHandler<CatalogQueryHandler>,
    commands: InvalidatingCommandHandler<CatalogCommandHandler>,
    invalidator: CacheInvalidator,
    store: CacheStore,
}

impl CatalogService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        categories: Arc<dyn CategoryRepository>,
        store: CacheStore,
    ) -> Self {
        let invalidator = CacheInvalidator::new(store.clone());

        Self {
            queries: CachingQueryHandler::new(
                CatalogQueryHandler::new(products.clone(), categories.clone()),
                store.clone(),
            ),
            commands: InvalidatingCommandHandler::new(
                CatalogCommandHandler::new(products, categories),
                invalidator.clone(),
            ),
            invalidator,
            store,
        }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    // Reads

    pub async fn get_product(&self, ctx: &CacheContext, id: &str) -> Result<Product, DomainError> {
        let id = ProductId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        self.queries.handle(ctx, GetProduct { id }).await
    }

    pub async fn list_products(
        &self,
        ctx: &CacheContext,
        page: PageRequest,
    ) -> Result<Page<Product>, DomainError> {
        self.queries.handle(ctx, ListProducts { page }).await
    }

    pub async fn search_products(
        &self,
        ctx: &CacheContext,
        term: &str,
        page: PageRequest,
    ) -> Result<Page<Product>, DomainError> {
        if term.trim().is_empty() {
            return Err(DomainError::validation("Search term cannot be empty"));
        }

        let query = SearchProducts {
            term: term.to_string(),
            page,
        };
        self.queries.handle(ctx, query).await
    }

    pub async fn get_category(
        &self,
        ctx: &CacheContext,
        id: &str,
    ) -> Result<Category, DomainError> {
        let id = CategoryId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        self.queries.handle(ctx, GetCategory { id }).await
    }

    pub async fn list_categories(&self, ctx: &CacheContext) -> Result<Vec<Category>, DomainError> {
        self.queries.handle(ctx, ListCategories).await
    }

    pub async fn dashboard_stats(&self, ctx: &CacheContext) -> Result<DashboardStats, DomainError> {
        self.queries.handle(ctx, GetDashboardStats).await
    }

    // Writes

    pub async fn create_product(
        &self,
        ctx: &CacheContext,
        command: CreateProduct,
    ) -> Result<Product, DomainError> {
        self.commands.handle(ctx, command).await
    }

    pub async fn update_product(
        &self,
        ctx: &CacheContext,
        command: UpdateProduct,
    ) -> Result<Product, DomainError> {
        self.commands.handle(ctx, command).await
    }

    pub async fn delete_product(&self, ctx: &CacheContext, id: &str) -> Result<(), DomainError> {
        let id = ProductId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        self.commands.handle(ctx, DeleteProduct { id }).await
    }

    pub async fn create_category(
        &self,
        ctx: &CacheContext,
        command: CreateCategory,
    ) -> Result<Category, DomainError> {
        self.commands.handle(ctx, command).await
    }

    pub async fn update_category(
        &self,
        ctx: &CacheContext,
        command: UpdateCategory,
    ) -> Result<Category, DomainError> {
        self.commands.handle(ctx, command).await
    }

    pub async fn delete_category(&self, ctx: &CacheContext, id: &str) -> Result<(), DomainError> {
        let id = CategoryId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        self.commands.handle(ctx, DeleteCategory { id }).await
    }

    // Operations

    /// Drops every cached entry under `prefix`, returning how many were removed
    pub async fn flush_prefix(&self, ctx: &CacheContext, prefix: &str) -> Result<usize, DomainError> {
        validate_prefix(prefix)?;

        let removed = self.invalidator.invalidate(ctx, &[prefix]).await;
        info!(prefix = %prefix, removed, "Flushed cache prefix");

        Ok(removed)
    }

    /// Whether the cache backend answers right now
    pub async fn cache_available(&self, ctx: &CacheContext) -> bool {
        self.store.ping(ctx).await
    }
}
