//! Catalog write requests and the cached reads they make stale

use super::category::{Category, CategoryId};
use super::product::{Product, ProductId};
use super::queries::{CATEGORIES_PREFIX, DASHBOARD_PREFIX, PRODUCTS_PREFIX};
use crate::domain::pipeline::{Command, InvalidatesCache};

const PRODUCT_WRITES: &[&str] = &[PRODUCTS_PREFIX, DASHBOARD_PREFIX];
const CATEGORY_WRITES: &[&str] = &[CATEGORIES_PREFIX, DASHBOARD_PREFIX];

/// Creates a product; the ID is generated when absent
#[derive(Debug, Clone)]
pub struct CreateProduct {
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub category_id: String,
    pub stock: u32,
}

impl Command for CreateProduct {
    type Output = Product;
}

impl InvalidatesCache for CreateProduct {
    fn invalidated_prefixes(&self) -> &'static [&'static str] {
        PRODUCT_WRITES
    }
}

/// Partial product update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateProduct {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub category_id: Option<String>,
    pub stock: Option<u32>,
}

impl Command for UpdateProduct {
    type Output = Product;
}

impl InvalidatesCache for UpdateProduct {
    fn invalidated_prefixes(&self) -> &'static [&'static str] {
        PRODUCT_WRITES
    }
}

#[derive(Debug, Clone)]
pub struct DeleteProduct {
    pub id: ProductId,
}

impl Command for DeleteProduct {
    type Output = ();
}

impl InvalidatesCache for DeleteProduct {
    fn invalidated_prefixes(&self) -> &'static [&'static str] {
        PRODUCT_WRITES
    }
}

#[derive(Debug, Clone)]
pub struct CreateCategory {
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
}

impl Command for CreateCategory {
    type Output = Category;
}

impl InvalidatesCache for CreateCategory {
    fn invalidated_prefixes(&self) -> &'static [&'static str] {
        CATEGORY_WRITES
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCategory {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Command for UpdateCategory {
    type Output = Category;
}

impl InvalidatesCache for UpdateCategory {
    fn invalidated_prefixes(&self) -> &'static [&'static str] {
        CATEGORY_WRITES
    }
}

/// Deletes an empty category
///
/// Cached product pages embed category IDs, so products are invalidated too.
#[derive(Debug, Clone)]
pub struct DeleteCategory {
    pub id: CategoryId,
}

impl Command for DeleteCategory {
    type Output = ();
}

impl InvalidatesCache for DeleteCategory {
    fn invalidated_prefixes(&self) -> &'static [&'static str] {
        &[CATEGORIES_PREFIX, PRODUCTS_PREFIX, DASHBOARD_PREFIX]
    }
}
