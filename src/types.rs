//! Common types used throughout hopstream
//!
//! This module contains the record and page model shared by the
//! fetcher, the pagination source and the service boundary.

use serde::{Deserialize, Serialize};

// ============================================================================
// Record
// ============================================================================

/// A single upstream record
///
/// Only the four fields below are kept; anything else the upstream
/// sends is ignored while decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    #[serde(default)]
    pub tagline: String,
    pub abv: f64,
    #[serde(default)]
    pub description: String,
}

impl Record {
    /// Create a record
    pub fn new(
        name: impl Into<String>,
        tagline: impl Into<String>,
        abv: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            tagline: tagline.into(),
            abv,
            description: description.into(),
        }
    }
}

// ============================================================================
// Page
// ============================================================================

/// One batch of records returned by a single upstream request
///
/// An empty page marks the end of pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    index: u32,
    records: Vec<Record>,
}

impl Page {
    /// Create a page for the given index
    pub fn new(index: u32, records: Vec<Record>) -> Self {
        Self { index, records }
    }

    /// Create the exhaustion sentinel for the given index
    pub fn empty(index: u32) -> Self {
        Self::new(index, Vec::new())
    }

    /// The page index that produced this page
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Records in upstream order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True for the exhaustion sentinel
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume the page, yielding its records
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for transport retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}
