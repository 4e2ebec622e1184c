//! Catalog domain module
//!
//! Products belong to exactly one category. These are the entities whose reads are
//! cached and whose writes drive invalidation.

mod category;
mod commands;
mod product;
mod queries;
mod repository;
mod validation;

pub use category::{Category, CategoryId};
pub use commands::{
    CreateCategory, CreateProduct, DeleteCategory, DeleteProduct, UpdateCategory, UpdateProduct,
};
pub use product::{Product, ProductId};
pub use queries::{
    CATEGORIES_PREFIX, CategoryProductCount, DASHBOARD_PREFIX, DASHBOARD_TTL, DashboardStats,
    GetCategory, GetDashboardStats, GetProduct, ListCategories, ListProducts, PRODUCTS_PREFIX,
    SearchProducts,
};
pub use repository::{CategoryRepository, Page, PageRequest, ProductRepository};
pub use validation::{
    CatalogValidationError, validate_catalog_id, validate_name, validate_price,
};

#[cfg(test)]
pub use repository::MockProductRepository;
