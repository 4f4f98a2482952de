//! Response decoder module
//!
//! Turns an upstream response body into a [`Page`](crate::types::Page).
//!
//! # Overview
//!
//! The upstream returns a JSON array of records, either at the top level
//! or nested under a configured dot-separated path (`data.items`).
//! Anything that is not an array of record-shaped objects is a decode error.

mod decoder;

pub use decoder::PageDecoder;
