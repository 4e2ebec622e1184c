//! API layer - HTTP endpoints

pub mod categories;
pub mod health;
pub mod operations;
pub mod products;
pub mod router;
pub mod state;
pub mod types;

pub use router::create_router_with_state;
pub use state::AppState;
