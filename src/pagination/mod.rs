//! Pagination module
//!
//! Page-number pagination that stops at the first empty page.
//!
//! # Overview
//!
//! A [`PaginationSource`] owns the cursor for exactly one subscription. It
//! only fetches when the consumer asks for the next page, never runs ahead,
//! and ends permanently on an empty page, a failed fetch, or cancellation.

mod source;
mod types;

pub use source::PaginationSource;
pub use types::{Cursor, PageNumberConfig, SourceState};
