//! Engine types
//!
//! Outcome and statistics types for pipeline subscriptions.

use crate::types::Record;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Result of driving a subscription to the end
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Every page was consumed (or the configured limit was reached)
    Complete(Vec<Record>),
    /// The consumer withdrew before the end; nothing is returned
    Cancelled,
}

impl Outcome {
    /// The collected records, if complete
    pub fn into_records(self) -> Option<Vec<Record>> {
        match self {
            Self::Complete(records) => Some(records),
            Self::Cancelled => None,
        }
    }

    /// Check if the subscription was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// How a subscription ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// An empty page was observed
    Completed,
    /// The match limit was reached
    LimitReached,
    /// A fetch or decode failed
    Failed,
    /// The consumer cancelled
    Cancelled,
}

/// Statistics from one subscription
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    /// Non-empty pages received
    pub pages_fetched: u64,
    /// Records received from the upstream
    pub records_seen: u64,
    /// Records that passed the filter and were delivered
    pub records_matched: u64,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Shared counters updated while a subscription runs
#[derive(Debug)]
pub(crate) struct StatsRecorder {
    started: Instant,
    pages_fetched: AtomicU64,
    records_seen: AtomicU64,
    records_matched: AtomicU64,
}

impl StatsRecorder {
    pub(crate) fn new() -> Self {
        Self {
            started: Instant::now(),
            pages_fetched: AtomicU64::new(0),
            records_seen: AtomicU64::new(0),
            records_matched: AtomicU64::new(0),
        }
    }

    pub(crate) fn add_page(&self, records: usize) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
        self.records_seen
            .fetch_add(records as u64, Ordering::Relaxed);
    }

    /// Count a delivered match, returning the new total
    pub(crate) fn add_match(&self) -> u64 {
        self.records_matched.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn snapshot(&self) -> PipelineStats {
        PipelineStats {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            records_seen: self.records_seen.load(Ordering::Relaxed),
            records_matched: self.records_matched.load(Ordering::Relaxed),
            duration_ms: self.started.elapsed().as_millis() as u64,
        }
    }
}
