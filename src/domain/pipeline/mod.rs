//! Request pipeline - query/command traits and the caching decorators around them

mod caching;
mod command;
mod invalidation;
mod query;

pub use caching::CachingQueryHandler;
pub use command::{Command, CommandHandler, InvalidatesCache};
pub use invalidation::{CacheInvalidator, InvalidatingCommandHandler};
pub use query::{CacheableQuery, Query, QueryHandler};
