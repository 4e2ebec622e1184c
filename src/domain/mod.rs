//! Domain layer - entities, cache abstractions and the request pipeline

pub mod cache;
pub mod catalog;
pub mod error;
pub mod pipeline;

pub use cache::{CacheBackend, CacheContext, CacheKeyBuilder, CacheStore, ExpirationPolicy};
pub use catalog::{Category, CategoryId, Page, PageRequest, Product, ProductId};
pub use error::DomainError;
pub use pipeline::{
    CacheInvalidator, CacheableQuery, CachingQueryHandler, Command, CommandHandler,
    InvalidatesCache, InvalidatingCommandHandler, Query, QueryHandler,
};
