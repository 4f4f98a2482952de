//! Pagination types
//!
//! Defines the cursor, the source state machine and the query
//! parameters for page-number pagination.

use serde::{Deserialize, Serialize};

/// The page index currently under fetch
///
/// Only moves forward, one page at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cursor(u32);

impl Cursor {
    /// Create a cursor positioned at the first page
    pub fn new(first_page: u32) -> Self {
        Self(first_page)
    }

    /// Current page index
    pub fn page(self) -> u32 {
        self.0
    }

    /// The cursor for the following page, or `None` on overflow
    #[must_use]
    pub fn advance(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "page {}", self.0)
    }
}

/// State of a pagination source
///
/// `Fetching` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    /// Next poll fetches this page
    Fetching(Cursor),
    /// An empty page was observed
    Complete,
    /// A fetch failed and the error was emitted
    Failed,
    /// The consumer withdrew demand
    Cancelled,
}

impl SourceState {
    /// Check if no further fetches will be issued
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Fetching(_))
    }
}

/// Query parameters for page-number pagination
///
/// Common patterns:
/// - `?page=2`
/// - `?page=2&per_page=50`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageNumberConfig {
    /// Query parameter name for the page number
    pub page_param: String,
    /// First page number (usually 0 or 1)
    pub first_page: u32,
    /// Optional page size parameter name
    pub page_size_param: String,
    /// Page size value, omitted from requests when unset
    pub page_size: Option<u32>,
}

impl Default for PageNumberConfig {
    fn default() -> Self {
        Self {
            page_param: "page".to_string(),
            first_page: 1,
            page_size_param: "per_page".to_string(),
            page_size: None,
        }
    }
}

impl PageNumberConfig {
    /// Create a config with the given page parameter and first page
    pub fn new(page_param: impl Into<String>, first_page: u32) -> Self {
        Self {
            page_param: page_param.into(),
            first_page,
            ..Default::default()
        }
    }

    /// Set page size parameter
    #[must_use]
    pub fn with_page_size(mut self, param: impl Into<String>, size: u32) -> Self {
        self.page_size_param = param.into();
        self.page_size = Some(size);
        self
    }

    /// Query parameters for the given page
    pub fn query_for(&self, page: u32) -> Vec<(String, String)> {
        let mut params = vec![(self.page_param.clone(), page.to_string())];
        if let Some(size) = self.page_size {
            params.push((self.page_size_param.clone(), size.to_string()));
        }
        params
    }
}
