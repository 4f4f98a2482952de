//! Execution engine module
//!
//! Composes fetcher, pagination, flattening and filtering into a pipeline.
//!
//! # Overview
//!
//! The engine module provides:
//! - `Pipeline` - Immutable description of the fetch-flatten-filter chain
//! - `Subscription` - One live run of a pipeline, consumed as a `Stream`
//! - `Outcome` / `PipelineStats` - Results of a run
//!
//! Building a `Pipeline` does no work. Each `subscribe` creates a fresh
//! pagination source with its own cursor, and nothing is fetched until the
//! subscription is polled.

mod types;

pub use types::{FinishReason, Outcome, PipelineStats};

use crate::error::Result;
use crate::fetch::PageFetcher;
use crate::pagination::PaginationSource;
use crate::stream::{flatten_pages, FilterStage, RecordStream};
use crate::types::Record;
use futures::{Stream, StreamExt, TryStreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use types::StatsRecorder;

/// The page-fetch-filter-emit pipeline
#[derive(Clone)]
pub struct Pipeline {
    fetcher: Arc<dyn PageFetcher>,
    filter: FilterStage,
    limit: Option<u64>,
}

impl Pipeline {
    /// Create a pipeline over the given fetcher and filter
    pub fn new(fetcher: Arc<dyn PageFetcher>, filter: FilterStage) -> Self {
        Self {
            fetcher,
            filter,
            limit: None,
        }
    }

    /// Stop after this many matching records
    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Start a new subscription
    ///
    /// Cancelling `token` stops the subscription at the next record or
    /// page boundary, whichever comes first.
    pub fn subscribe(&self, token: CancellationToken) -> Subscription {
        let token = token.child_token();
        let stats = Arc::new(StatsRecorder::new());

        let page_stats = Arc::clone(&stats);
        let pages = PaginationSource::new(Arc::clone(&self.fetcher), token.clone())
            .into_stream()
            .inspect_ok(move |page| page_stats.add_page(page.len()));

        let records = self.filter.apply(flatten_pages(pages, token.clone()));

        let mut subscription = Subscription {
            records,
            token,
            stats,
            limit: self.limit,
            finished: None,
        };
        if self.limit == Some(0) {
            subscription.cancel();
            subscription.finish(FinishReason::LimitReached);
        }
        subscription
    }

    /// Drive a subscription to the end and collect every match
    ///
    /// Either all matches or the first error; a cancelled run yields
    /// [`Outcome::Cancelled`] and no records.
    pub async fn collect(&self, token: CancellationToken) -> Result<Outcome> {
        let mut subscription = self.subscribe(token);
        let mut records = Vec::new();

        while let Some(record) = subscription.next().await {
            records.push(record?);
        }

        if subscription.finish_reason() == Some(FinishReason::Cancelled) {
            return Ok(Outcome::Cancelled);
        }
        Ok(Outcome::Complete(records))
    }

    /// Run [`collect`](Self::collect) on a separate tokio task
    pub fn spawn_collect(&self, token: CancellationToken) -> JoinHandle<Result<Outcome>> {
        let pipeline = self.clone();
        tokio::spawn(async move { pipeline.collect(token).await })
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("filter", &self.filter)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

/// One live run of a [`Pipeline`]
///
/// Yields matching records in upstream order. After an error the stream
/// ends; a consumer must treat a stream that ended on `Err` as incomplete.
pub struct Subscription {
    records: RecordStream,
    token: CancellationToken,
    stats: Arc<StatsRecorder>,
    limit: Option<u64>,
    finished: Option<FinishReason>,
}

impl Subscription {
    /// Cancel this subscription
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Token observed by this subscription
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Statistics so far
    pub fn stats(&self) -> PipelineStats {
        self.stats.snapshot()
    }

    /// How the subscription ended, if it has
    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finished
    }

    fn finish(&mut self, reason: FinishReason) {
        if self.finished.is_some() {
            return;
        }
        self.finished = Some(reason);

        let stats = self.stats.snapshot();
        match reason {
            FinishReason::Completed | FinishReason::LimitReached => info!(
                "Pipeline {:?}: {} pages, {} records, {} matched in {}ms",
                reason,
                stats.pages_fetched,
                stats.records_seen,
                stats.records_matched,
                stats.duration_ms
            ),
            FinishReason::Cancelled => debug!(
                "Pipeline cancelled after {} pages, {} matched",
                stats.pages_fetched, stats.records_matched
            ),
            FinishReason::Failed => warn!(
                "Pipeline failed after {} pages, {} matched",
                stats.pages_fetched, stats.records_matched
            ),
        }
    }
}

impl Stream for Subscription {
    type Item = Result<Record>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished.is_some() {
            return Poll::Ready(None);
        }

        match self.records.poll_next_unpin(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(record))) => {
                let matched = self.stats.add_match();
                if self.limit.is_some_and(|limit| matched >= limit) {
                    self.token.cancel();
                    self.finish(FinishReason::LimitReached);
                }
                Poll::Ready(Some(Ok(record)))
            }
            Poll::Ready(Some(Err(e))) => {
                self.finish(FinishReason::Failed);
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                let reason = if self.token.is_cancelled() {
                    FinishReason::Cancelled
                } else {
                    FinishReason::Completed
                };
                self.finish(reason);
                Poll::Ready(None)
            }
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("limit", &self.limit)
            .field("finished", &self.finished)
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
