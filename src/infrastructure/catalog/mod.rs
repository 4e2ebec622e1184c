//! Catalog infrastructure - repositories, handlers and the cached service

mod handlers;
mod repository;
mod service;

pub use handlers::{CatalogCommandHandler, CatalogQueryHandler};
pub use repository::{InMemoryCategoryRepository, InMemoryProductRepository};
pub use service::CatalogService;
