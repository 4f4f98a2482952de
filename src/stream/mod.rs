//! Record stream module
//!
//! Flattening of pages into records and predicate filtering.
//!
//! # Overview
//!
//! - [`flatten_pages`] turns a page stream into a [`RecordStream`], keeping
//!   page-then-intra-page order and stopping as soon as the token fires
//! - [`FilterStage`] forwards only records matching a [`RecordPredicate`]

mod filter;
mod records;

pub use filter::{AbvAbove, FilterStage, RecordPredicate};
pub use records::{flatten_pages, RecordStream};
