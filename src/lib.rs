// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # hopstream
//!
//! Streams records from a page-numbered HTTP API, keeps the ones that
//! match a predicate, and serves them over HTTP either as one collected
//! JSON array or as a body written record by record.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hopstream::{config::AppConfig, engine::Pipeline, stream::FilterStage};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> hopstream::Result<()> {
//!     let config = AppConfig::load("hopstream.yaml")?;
//!     let fetcher = Arc::new(config.upstream.build_fetcher()?);
//!
//!     let pipeline = Pipeline::new(fetcher, FilterStage::abv_above(7.0));
//!     let outcome = pipeline.collect(CancellationToken::new()).await?;
//!
//!     for beer in outcome.into_records().unwrap_or_default() {
//!         println!("{} ({}%)", beer.name, beer.abv);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  GET /beer (collect)          GET /beer/stream (chunked)     │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!               Pipeline::subscribe(CancellationToken)
//!                               │
//! ┌────────────┬───────────────┬┴──────────────┬────────────────┐
//! │   Fetch    │   Paginate    │    Flatten    │     Filter     │
//! ├────────────┼───────────────┼───────────────┼────────────────┤
//! │ HttpClient │ Cursor        │ Page → Record │ AbvAbove       │
//! │ Decoder    │ stop on empty │ cancel-aware  │ any predicate  │
//! │ Rate limit │ stop on error │               │                │
//! └────────────┴───────────────┴───────────────┴────────────────┘
//! ```
//!
//! Nothing is fetched until a subscription is polled, and at most one
//! page request is in flight per subscription.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Records, pages and shared enums
pub mod types;

/// HTTP client with retry and rate limiting
pub mod http;

/// Response body decoding
pub mod decode;

/// Page fetching
pub mod fetch;

/// Page-number pagination source
pub mod pagination;

/// Record flattening and filtering
pub mod stream;

/// Pipeline composition and execution
pub mod engine;

/// Application configuration
pub mod config;

/// Command-line interface and HTTP server
pub mod cli;

#[cfg(test)]
mod test_support;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, ErrorKind, Result};
pub use types::*;

pub use engine::{Outcome, Pipeline, PipelineStats, Subscription};
pub use fetch::{HttpPageFetcher, PageFetcher};
pub use stream::FilterStage;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
