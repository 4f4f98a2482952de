//! HTTP transport module
//!
//! Everything between a page request and the upstream socket.
//!
//! # Features
//!
//! - **Static Headers**: User agent and fixed headers on every request
//! - **Optional Retries**: [`RetryPolicy`], off by default
//! - **Throttling**: Shared governor token bucket

mod client;
mod retry;
mod throttle;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use retry::RetryPolicy;
pub use throttle::{RateLimit, Throttle};
