//! Catalog query and command handlers backed by the repositories

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use crate::domain::DomainError;
use crate::domain::cache::CacheContext;
use crate::domain::catalog::{
    Category, CategoryId, CategoryProductCount, CategoryRepository, CreateCategory,
    CreateProduct, DashboardStats, DeleteCategory, DeleteProduct, GetCategory,
    GetDashboardStats, GetProduct, ListCategories, ListProducts, Page, Product, ProductId,
    ProductRepository, SearchProducts, UpdateCategory, UpdateProduct,
};
use crate::domain::pipeline::{CommandHandler, QueryHandler};

fn parse_product_id(raw: &str) -> Result<ProductId, DomainError> {
    ProductId::new(raw).map_err(|e| DomainError::invalid_id(e.to_string()))
}

fn parse_category_id(raw: &str) -> Result<CategoryId, DomainError> {
    CategoryId::new(raw).map_err(|e| DomainError::invalid_id(e.to_string()))
}

/// Answers catalog queries straight from the repositories
#[derive(Debug, Clone)]
pub struct CatalogQueryHandler {
    products: Arc<dyn ProductRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl CatalogQueryHandler {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            products,
            categories,
        }
    }
}

#[async_trait]
impl QueryHandler<GetProduct> for CatalogQueryHandler {
    async fn handle(&self, _ctx: &CacheContext, query: GetProduct) -> Result<Product, DomainError> {
        self.products
            .get(&query.id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Product '{}' not found", query.id)))
    }
}

#[async_trait]
impl QueryHandler<ListProducts> for CatalogQueryHandler {
    async fn handle(
        &self,
        _ctx: &CacheContext,
        query: ListProducts,
    ) -> Result<Page<Product>, DomainError> {
        self.products.list(query.page).await
    }
}

#[async_trait]
impl QueryHandler<SearchProducts> for CatalogQueryHandler {
    async fn handle(
        &self,
        _ctx: &CacheContext,
        query: SearchProducts,
    ) -> Result<Page<Product>, DomainError> {
        self.products.search(&query.term, query.page).await
    }
}

#[async_trait]
impl QueryHandler<GetCategory> for CatalogQueryHandler {
    async fn handle(
        &self,
        _ctx: &CacheContext,
        query: GetCategory,
    ) -> Result<Category, DomainError> {
        self.categories
            .get(&query.id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Category '{}' not found", query.id)))
    }
}

#[async_trait]
impl QueryHandler<ListCategories> for CatalogQueryHandler {
    async fn handle(
        &self,
        _ctx: &CacheContext,
        _query: ListCategories,
    ) -> Result<Vec<Category>, DomainError> {
        self.categories.list().await
    }
}

#[async_trait]
impl QueryHandler<GetDashboardStats> for CatalogQueryHandler {
    async fn handle(
        &self,
        _ctx: &CacheContext,
        _query: GetDashboardStats,
    ) -> Result<DashboardStats, DomainError> {
        let categories = self.categories.list().await?;
        let mut products_per_category = Vec::with_capacity(categories.len());

        for category in &categories {
            products_per_category.push(CategoryProductCount {
                category_id: category.id().clone(),
                name: category.name().to_string(),
                product_count: self.products.count_in_category(category.id()).await?,
            });
        }

        Ok(DashboardStats {
            product_count: self.products.count().await?,
            category_count: categories.len(),
            products_per_category,
            generated_at: Utc::now(),
        })
    }
}

/// Applies catalog writes to the repositories
#[derive(Debug, Clone)]
pub struct CatalogCommandHandler {
    products: Arc<dyn ProductRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl CatalogCommandHandler {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            products,
            categories,
        }
    }

    async fn existing_category(&self, raw: &str) -> Result<CategoryId, DomainError> {
        let id = parse_category_id(raw)?;

        if !self.categories.exists(&id).await? {
            return Err(DomainError::validation(format!(
                "Category '{}' does not exist",
                id
            )));
        }

        Ok(id)
    }
}

#[async_trait]
impl CommandHandler<CreateProduct> for CatalogCommandHandler {
    async fn handle(
        &self,
        _ctx: &CacheContext,
        command: CreateProduct,
    ) -> Result<Product, DomainError> {
        let id = match command.id.as_deref() {
            Some(raw) => parse_product_id(raw)?,
            None => ProductId::generate(),
        };
        let category_id = self.existing_category(&command.category_id).await?;

        info!(id = %id, category = %category_id, "Creating product");

        let mut product = Product::new(id, command.name, command.price_cents, category_id)
            .map_err(|e| DomainError::validation(e.to_string()))?
            .with_stock(command.stock);

        if let Some(description) = command.description {
            product = product.with_description(description);
        }

        self.products.create(product).await
    }
}

#[async_trait]
impl CommandHandler<UpdateProduct> for CatalogCommandHandler {
    async fn handle(
        &self,
        _ctx: &CacheContext,
        command: UpdateProduct,
    ) -> Result<Product, DomainError> {
        let id = parse_product_id(&command.id)?;
        let mut product = self
            .products
            .get(&id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Product '{}' not found", id)))?;

        if let Some(name) = command.name {
            product
                .set_name(name)
                .map_err(|e| DomainError::validation(e.to_string()))?;
        }

        if let Some(price) = command.price_cents {
            product
                .set_price(price)
                .map_err(|e| DomainError::validation(e.to_string()))?;
        }

        if let Some(category) = command.category_id {
            let category_id = self.existing_category(&category).await?;
            product.set_category(category_id);
        }

        if let Some(stock) = command.stock {
            product.set_stock(stock);
        }

        if command.description.is_some() {
            product.set_description(command.description);
        }

        debug!(id = %id, "Updating product");
        self.products.update(product).await
    }
}

#[async_trait]
impl CommandHandler<DeleteProduct> for CatalogCommandHandler {
    async fn handle(&self, _ctx: &CacheContext, command: DeleteProduct) -> Result<(), DomainError> {
        if !self.products.delete(&command.id).await? {
            return Err(DomainError::not_found(format!(
                "Product '{}' not found",
                command.id
            )));
        }

        info!(id = %command.id, "Deleted product");
        Ok(())
    }
}

#[async_trait]
impl CommandHandler<CreateCategory> for CatalogCommandHandler {
    async fn handle(
        &self,
        _ctx: &CacheContext,
        command: CreateCategory,
    ) -> Result<Category, DomainError> {
        let id = match command.id.as_deref() {
            Some(raw) => parse_category_id(raw)?,
            None => CategoryId::generate(),
        };

        info!(id = %id, name = %command.name, "Creating category");

        let mut category =
            Category::new(id, command.name).map_err(|e| DomainError::validation(e.to_string()))?;

        if let Some(description) = command.description {
            category = category.with_description(description);
        }

        self.categories.create(category).await
    }
}

#[async_trait]
impl CommandHandler<UpdateCategory> for CatalogCommandHandler {
    async fn handle(
        &self,
        _ctx: &CacheContext,
        command: UpdateCategory,
    ) -> Result<Category, DomainError> {
        let id = parse_category_id(&command.id)?;
        let mut category = self
            .categories
            .get(&id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Category '{}' not found", id)))?;

        if let Some(name) = command.name {
            category
                .set_name(name)
                .map_err(|e| DomainError::validation(e.to_string()))?;
        }

        if command.description.is_some() {
            category.set_description(command.description);
        }

        debug!(id = %id, "Updating category");
        self.categories.update(category).await
    }
}

#[async_trait]
impl CommandHandler<DeleteCategory> for CatalogCommandHandler {
    async fn handle(
        &self,
        _ctx: &CacheContext,
        command: DeleteCategory,
    ) -> Result<(), DomainError> {
        let in_use = self.products.count_in_category(&command.id).await?;

        if in_use > 0 {
            return Err(DomainError::conflict(format!(
                "Category '{}' still has {} product(s)",
                command.id, in_use
            )));
        }

        if !self.categories.delete(&command.id).await? {
            return Err(DomainError::not_found(format!(
                "Category '{}' not found",
                command.id
            )));
        }

        info!(id = %command.id, "Deleted category");
        Ok(())
    }
}
