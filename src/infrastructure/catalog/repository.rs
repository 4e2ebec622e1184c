//! In-memory catalog repositories

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::DomainError;
use crate::domain::catalog::{
    Category, CategoryId, CategoryRepository, Page, PageRequest, Product, ProductId,
    ProductRepository,
};

fn by_name(a: &Product, b: &Product) -> std::cmp::Ordering {
    a.name()
        .to_lowercase()
        .cmp(&b.name().to_lowercase())
        .then_with(|| a.id().as_str().cmp(b.id().as_str()))
}

/// In-memory implementation of ProductRepository
#[derive(Debug)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<String, Product>>>,
}

impl InMemoryProductRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            products: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a repository seeded with products
    pub fn with_products(products: Vec<Product>) -> Self {
        let map = products
            .into_iter()
            .map(|p| (p.id().as_str().to_string(), p))
            .collect();

        Self {
            products: Arc::new(RwLock::new(map)),
        }
    }

    async fn sorted_matching(&self, predicate: impl Fn(&Product) -> bool) -> Vec<Product> {
        let products = self.products.read().await;
        let mut matching: Vec<Product> = products.values().filter(|p| predicate(*p)).cloned().collect();
        matching.sort_by(by_name);
        matching
    }
}

impl Default for InMemoryProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn get(&self, id: &ProductId) -> Result<Option<Product>, DomainError> {
        let products = self.products.read().await;
        Ok(products.get(id.as_str()).cloned())
    }

    async fn create(&self, product: Product) -> Result<Product, DomainError> {
        let mut products = self.products.write().await;
        let id = product.id().as_str().to_string();

        if products.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "Product '{}' already exists",
                id
            )));
        }

        products.insert(id, product.clone());
        Ok(product)
    }

    async fn update(&self, product: Product) -> Result<Product, DomainError> {
        let mut products = self.products.write().await;
        let id = product.id().as_str().to_string();

        if !products.contains_key(&id) {
            return Err(DomainError::not_found(format!("Product '{}' not found", id)));
        }

        products.insert(id, product.clone());
        Ok(product)
    }

    async fn delete(&self, id: &ProductId) -> Result<bool, DomainError> {
        let mut products = self.products.write().await;
        Ok(products.remove(id.as_str()).is_some())
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Product>, DomainError> {
        let all = self.sorted_matching(|_| true).await;
        Ok(Page::slice(all, page))
    }

    async fn search(&self, term: &str, page: PageRequest) -> Result<Page<Product>, DomainError> {
        let all = self.sorted_matching(|p| p.matches(term)).await;
        Ok(Page::slice(all, page))
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.products.read().await.len())
    }

    async fn count_in_category(&self, category_id: &CategoryId) -> Result<usize, DomainError> {
        let products = self.products.read().await;
        Ok(products
            .values()
            .filter(|p| p.category_id() == category_id)
            .count())
    }
}

/// In-memory implementation of CategoryRepository
#[derive(Debug)]
pub struct InMemoryCategoryRepository {
    categories: Arc<RwLock<HashMap<String, Category>>>,
}

impl InMemoryCategoryRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            categories: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a repository seeded with categories
    pub fn with_categories(categories: Vec<Category>) -> Self {
        let map = categories
            .into_iter()
            .map(|c| (c.id().as_str().to_string(), c))
            .collect();

        Self {
            categories: Arc::new(RwLock::new(map)),
        }
    }
}

impl Default for InMemoryCategoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn get(&self, id: &CategoryId) -> Result<Option<Category>, DomainError> {
        let categories = self.categories.read().await;
        Ok(categories.get(id.as_str()).cloned())
    }

    async fn create(&self, category: Category) -> Result<Category, DomainError> {
        let mut categories = self.categories.write().await;
        let id = category.id().as_str().to_string();

        if categories.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "Category '{}' already exists",
                id
            )));
        }

        categories.insert(id, category.clone());
        Ok(category)
    }

    async fn update(&self, category: Category) -> Result<Category, DomainError> {
        let mut categories = self.categories.write().await;
        let id = category.id().as_str().to_string();

        if !categories.contains_key(&id) {
            return Err(DomainError::not_found(format!("Category '{}' not found", id)));
        }

        categories.insert(id, category.clone());
        Ok(category)
    }

    async fn delete(&self, id: &CategoryId) -> Result<bool, DomainError> {
        let mut categories = self.categories.write().await;
        Ok(categories.remove(id.as_str()).is_some())
    }

    async fn list(&self) -> Result<Vec<Category>, DomainError> {
        let categories = self.categories.read().await;
        let mut all: Vec<Category> = categories.values().cloned().collect();
        all.sort_by(|a, b| {
            a.name()
                .to_lowercase()
                .cmp(&b.name().to_lowercase())
                .then_with(|| a.id().as_str().cmp(b.id().as_str()))
        });
        Ok(all)
    }
}
