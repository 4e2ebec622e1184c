//! CLI module for the catalog cache service
//!
//! Subcommands:
//! - `serve`: run the HTTP API (default mode)
//! - `invalidate`: drop cached reads under a key prefix and exit

pub mod invalidate;
pub mod serve;

use clap::{Parser, Subcommand};

/// Product catalog service with a cache-aside read pipeline
#[derive(Parser)]
#[command(name = "catalog-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Remove every cached entry whose key starts with the prefix
    Invalidate(invalidate::InvalidateArgs),
}
