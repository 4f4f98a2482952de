//! Page fetcher trait and HTTP implementation

use crate::decode::PageDecoder;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::pagination::PageNumberConfig;
use crate::types::Page;
use async_trait::async_trait;
use tracing::debug;

/// Fetches a single page from the upstream
///
/// Implementations issue exactly one request per call and never retry;
/// retries, if any, are a property of the transport underneath.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Index of the first page
    fn first_page(&self) -> u32 {
        1
    }

    /// Fetch and decode one page
    async fn fetch(&self, page: u32) -> Result<Page>;
}

/// Fetches pages over HTTP with `GET {path}?{page_param}=N`
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: HttpClient,
    path: String,
    paging: PageNumberConfig,
    decoder: PageDecoder,
}

impl HttpPageFetcher {
    /// Create a fetcher for the collection at `path`
    pub fn new(client: HttpClient, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
            paging: PageNumberConfig::default(),
            decoder: PageDecoder::new(),
        }
    }

    /// Set pagination parameters
    #[must_use]
    pub fn with_paging(mut self, paging: PageNumberConfig) -> Self {
        self.paging = paging;
        self
    }

    /// Set the response decoder
    #[must_use]
    pub fn with_decoder(mut self, decoder: PageDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    /// Pagination parameters in use
    pub fn paging(&self) -> &PageNumberConfig {
        &self.paging
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    fn first_page(&self) -> u32 {
        self.paging.first_page
    }

    async fn fetch(&self, page: u32) -> Result<Page> {
        if page < self.paging.first_page {
            return Err(Error::PageOutOfRange {
                page,
                first_page: self.paging.first_page,
            });
        }

        let query = self.paging.query_for(page);
        let body = self.client.get_text(&self.path, &query).await?;

        let page = self.decoder.decode(page, &body)?;
        debug!("Fetched page {}: {} records", page.index(), page.len());
        Ok(page)
    }
}
