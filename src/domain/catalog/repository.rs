//! Catalog repository traits

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::category::{Category, CategoryId};
use super::product::{Product, ProductId};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Page request for listing products
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    pub const DEFAULT_PAGE_SIZE: usize = 20;
    pub const MAX_PAGE_SIZE: usize = 100;

    /// Creates a page request, clamping out-of-range values
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, Self::MAX_PAGE_SIZE),
        }
    }

    /// Saturates for very large pages, which then slice to nothing
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_PAGE_SIZE)
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
}

impl<T> Page<T> {
    /// Cuts a page out of an already sorted list
    pub fn slice(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len();
        let items = all
            .into_iter()
            .skip(request.offset())
            .take(request.page_size)
            .collect();

        Self {
            items,
            page: request.page,
            page_size: request.page_size,
            total,
        }
    }
}

/// Persistence for products
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync + std::fmt::Debug {
    async fn get(&self, id: &ProductId) -> Result<Option<Product>, DomainError>;

    async fn create(&self, product: Product) -> Result<Product, DomainError>;

    async fn update(&self, product: Product) -> Result<Product, DomainError>;

    async fn delete(&self, id: &ProductId) -> Result<bool, DomainError>;

    /// Products sorted by name
    async fn list(&self, page: PageRequest) -> Result<Page<Product>, DomainError>;

    /// Products whose name or description contains `term`, sorted by name
    async fn search(&self, term: &str, page: PageRequest) -> Result<Page<Product>, DomainError>;

    async fn count(&self) -> Result<usize, DomainError>;

    async fn count_in_category(&self, category_id: &CategoryId) -> Result<usize, DomainError>;
}

/// Persistence for categories
#[async_trait]
pub trait CategoryRepository: Send + Sync + std::fmt::Debug {
    async fn get(&self, id: &CategoryId) -> Result<Option<Category>, DomainError>;

    async fn create(&self, category: Category) -> Result<Category, DomainError>;

    async fn update(&self, category: Category) -> Result<Category, DomainError>;

    async fn delete(&self, id: &CategoryId) -> Result<bool, DomainError>;

    /// All categories sorted by name
    async fn list(&self) -> Result<Vec<Category>, DomainError>;

    async fn exists(&self, id: &CategoryId) -> Result<bool, DomainError> {
        Ok(self.get(id).await?.is_some())
    }
}
