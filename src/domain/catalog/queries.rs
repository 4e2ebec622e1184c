//! Catalog read requests and their cache keys

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::{Category, CategoryId};
use super::product::{Product, ProductId};
use super::repository::{Page, PageRequest};
use crate::domain::cache::{CacheKeyBuilder, ExpirationPolicy};
use crate::domain::pipeline::{CacheableQuery, Query};

pub const PRODUCTS: &str = "products";
pub const CATEGORIES: &str = "categories";
pub const DASHBOARD: &str = "dashboard";

/// Invalidation prefixes, one per entity collection
pub const PRODUCTS_PREFIX: &str = "products:";
pub const CATEGORIES_PREFIX: &str = "categories:";
pub const DASHBOARD_PREFIX: &str = "dashboard:";

/// Dashboard aggregates go stale quickly and are cheap to recompute
pub const DASHBOARD_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct GetProduct {
    pub id: ProductId,
}

impl Query for GetProduct {
    type Output = Product;
}

impl CacheableQuery for GetProduct {
    fn cache_key(&self) -> String {
        CacheKeyBuilder::new(PRODUCTS)
            .segment("id")
            .segment(&self.id)
            .build()
    }
}

#[derive(Debug, Clone)]
pub struct ListProducts {
    pub page: PageRequest,
}

impl Query for ListProducts {
    type Output = Page<Product>;
}

impl CacheableQuery for ListProducts {
    fn cache_key(&self) -> String {
        CacheKeyBuilder::new(PRODUCTS)
            .segment("paged")
            .segment(self.page.page)
            .segment(self.page.page_size)
            .build()
    }
}

/// Case-insensitive search over product names and descriptions
#[derive(Debug, Clone)]
pub struct SearchProducts {
    pub term: String,
    pub page: PageRequest,
}

impl Query for SearchProducts {
    type Output = Page<Product>;
}

impl CacheableQuery for SearchProducts {
    fn cache_key(&self) -> String {
        CacheKeyBuilder::new(PRODUCTS)
            .segment("search")
            .term(&self.term)
            .segment(self.page.page)
            .segment(self.page.page_size)
            .build()
    }
}

#[derive(Debug, Clone)]
pub struct GetCategory {
    pub id: CategoryId,
}

impl Query for GetCategory {
    type Output = Category;
}

impl CacheableQuery for GetCategory {
    fn cache_key(&self) -> String {
        CacheKeyBuilder::new(CATEGORIES)
            .segment("id")
            .segment(&self.id)
            .build()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListCategories;

impl Query for ListCategories {
    type Output = Vec<Category>;
}

impl CacheableQuery for ListCategories {
    fn cache_key(&self) -> String {
        CacheKeyBuilder::new(CATEGORIES).segment("all").build()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GetDashboardStats;

/// Catalog-wide aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub product_count: usize,
    pub category_count: usize,
    pub products_per_category: Vec<CategoryProductCount>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryProductCount {
    pub category_id: CategoryId,
    pub name: String,
    pub product_count: usize,
}

impl Query for GetDashboardStats {
    type Output = DashboardStats;
}

impl CacheableQuery for GetDashboardStats {
    fn cache_key(&self) -> String {
        CacheKeyBuilder::new(DASHBOARD).segment("stats").build()
    }

    fn cache_expiration(&self) -> Option<ExpirationPolicy> {
        Some(ExpirationPolicy::new(DASHBOARD_TTL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_keys() {
        let id = ProductId::new("p-1").unwrap();

        assert_eq!(GetProduct { id }.cache_key(), "products:id:p-1");
        assert_eq!(
            ListProducts {
                page: PageRequest::new(1, 10)
            }
            .cache_key(),
            "products:paged:1:10"
        );
    }

    #[test]
    fn test_search_key_normalizes_term() {
        let query = SearchProducts {
            term: "  Widget ".to_string(),
            page: PageRequest::new(2, 20),
        };

        assert_eq!(query.cache_key(), "products:search:widget:2:20");
    }

    #[test]
    fn test_search_key_hashes_unsafe_terms() {
        let query = SearchProducts {
            term: "red shoes".to_string(),
            page: PageRequest::default(),
        };

        let key = query.cache_key();
        assert!(key.starts_with("products:search:h-"));
        assert!(key.ends_with(":1:20"));
        assert!(!key.contains(' '));
    }

    #[test]
    fn test_category_and_dashboard_keys() {
        let id = CategoryId::new("books").unwrap();

        assert_eq!(GetCategory { id }.cache_key(), "categories:id:books");
        assert_eq!(ListCategories.cache_key(), "categories:all");
        assert_eq!(GetDashboardStats.cache_key(), "dashboard:stats");
    }

    #[test]
    fn test_every_key_falls_under_its_invalidation_prefix() {
        let product = GetProduct {
            id: ProductId::new("p-1").unwrap(),
        };
        let category = GetCategory {
            id: CategoryId::new("c-1").unwrap(),
        };

        assert!(product.cache_key().starts_with(PRODUCTS_PREFIX));
        assert!(ListCategories.cache_key().starts_with(CATEGORIES_PREFIX));
        assert!(category.cache_key().starts_with(CATEGORIES_PREFIX));
        assert!(GetDashboardStats.cache_key().starts_with(DASHBOARD_PREFIX));
        assert_eq!(
            CacheKeyBuilder::entity_prefix(PRODUCTS),
            PRODUCTS_PREFIX.to_string()
        );
    }

    #[test]
    fn test_dashboard_expiration_has_no_sliding_window() {
        let policy = GetDashboardStats.cache_expiration().unwrap();

        assert_eq!(policy.absolute(), DASHBOARD_TTL);
        assert_eq!(policy.sliding(), None);
    }
}
