//! Infrastructure layer - cache backends, catalog storage, logging and metrics

pub mod cache;
pub mod catalog;
pub mod logging;
pub mod observability;
