//! CLI module
//!
//! Command-line interface for the record service.
//!
//! # Commands
//!
//! - `serve` - Start HTTP server mode
//! - `fetch` - Run the pipeline once and print matching records

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
pub use server::{router, serve, ServerConfig};
