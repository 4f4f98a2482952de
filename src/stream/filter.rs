//! Predicate filtering

use super::records::RecordStream;
use crate::types::Record;
use futures::future;
use futures::TryStreamExt;
use std::sync::Arc;

/// A pure test applied to each record
pub trait RecordPredicate: Send + Sync {
    /// Check if the record should be forwarded
    fn matches(&self, record: &Record) -> bool;
}

impl<F> RecordPredicate for F
where
    F: Fn(&Record) -> bool + Send + Sync,
{
    fn matches(&self, record: &Record) -> bool {
        self(record)
    }
}

/// Matches records whose abv is strictly greater than the threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbvAbove(pub f64);

impl RecordPredicate for AbvAbove {
    fn matches(&self, record: &Record) -> bool {
        record.abv > self.0
    }
}

/// Forwards only matching records, one at a time
#[derive(Clone)]
pub struct FilterStage {
    predicate: Arc<dyn RecordPredicate>,
}

impl FilterStage {
    /// Create a filter stage from any predicate
    pub fn new(predicate: impl RecordPredicate + 'static) -> Self {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    /// Filter stage for `abv > threshold`
    pub fn abv_above(threshold: f64) -> Self {
        Self::new(AbvAbove(threshold))
    }

    /// Forward every record
    pub fn pass_all() -> Self {
        Self::new(|_: &Record| true)
    }

    /// Check a single record
    pub fn matches(&self, record: &Record) -> bool {
        self.predicate.matches(record)
    }

    /// Apply the predicate to a record stream
    ///
    /// Errors pass through untouched.
    pub fn apply(&self, records: RecordStream) -> RecordStream {
        let predicate = Arc::clone(&self.predicate);
        Box::pin(records.try_filter(move |record| future::ready(predicate.matches(record))))
    }
}

impl std::fmt::Debug for FilterStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterStage").finish_non_exhaustive()
    }
}
