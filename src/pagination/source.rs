//! Pull-based pagination source

use super::types::{Cursor, SourceState};
use crate::error::Result;
use crate::fetch::PageFetcher;
use crate::types::Page;
use futures::Stream;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Drives a [`PageFetcher`] one page at a time
///
/// Created fresh for every subscription. Nothing is fetched until
/// [`next_page`](Self::next_page) is awaited.
pub struct PaginationSource {
    fetcher: Arc<dyn PageFetcher>,
    state: SourceState,
    token: CancellationToken,
}

impl PaginationSource {
    /// Create a source positioned at the fetcher's first page
    pub fn new(fetcher: Arc<dyn PageFetcher>, token: CancellationToken) -> Self {
        let cursor = Cursor::new(fetcher.first_page());
        Self {
            fetcher,
            state: SourceState::Fetching(cursor),
            token,
        }
    }

    /// Current state
    pub fn state(&self) -> SourceState {
        self.state
    }

    /// Fetch the next non-empty page
    ///
    /// Returns `None` once the source is complete or cancelled. A failed
    /// fetch is returned once, after which the source yields `None`.
    pub async fn next_page(&mut self) -> Option<Result<Page>> {
        let SourceState::Fetching(cursor) = self.state else {
            return None;
        };

        if self.token.is_cancelled() {
            debug!("Cancelled before fetching {}", cursor);
            self.state = SourceState::Cancelled;
            return None;
        }

        let fetched = tokio::select! {
            biased;
            () = self.token.cancelled() => None,
            result = self.fetcher.fetch(cursor.page()) => Some(result),
        };
        let Some(result) = fetched else {
            debug!("Cancelled while fetching {}, discarding in-flight request", cursor);
            self.state = SourceState::Cancelled;
            return None;
        };

        match result {
            Ok(page) if page.is_empty() => {
                debug!("Empty {}, pagination complete", cursor);
                self.state = SourceState::Complete;
                None
            }
            Ok(page) => {
                self.state = match cursor.advance() {
                    Some(next) => SourceState::Fetching(next),
                    None => SourceState::Complete,
                };
                Some(Ok(page))
            }
            Err(e) => {
                warn!("Fetch of {} failed: {}", cursor, e);
                self.state = SourceState::Failed;
                Some(Err(e))
            }
        }
    }

    /// Turn the source into a lazy stream of pages
    pub fn into_stream(self) -> impl Stream<Item = Result<Page>> + Send {
        futures::stream::unfold(self, |mut source| async move {
            let item = source.next_page().await?;
            Some((item, source))
        })
    }
}

impl std::fmt::Debug for PaginationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationSource")
            .field("state", &self.state)
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}
