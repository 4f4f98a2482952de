//! Page fetcher module
//!
//! One outbound request per page number, decoded into a [`Page`](crate::types::Page).
//!
//! # Overview
//!
//! [`PageFetcher`] is the seam between the pagination core and the network.
//! [`HttpPageFetcher`] is the production implementation; tests substitute
//! scripted fetchers to observe exactly which pages were requested.

mod fetcher;

pub use fetcher::{HttpPageFetcher, PageFetcher};

#[cfg(test)]
mod tests;
