//! Page flattening

use crate::error::{Error, Result};
use crate::types::{Page, Record};
use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

/// Lazy, cancellable stream of records
pub type RecordStream = Pin<Box<dyn Stream<Item = Result<Record>> + Send>>;

/// Flatten a page stream into individual records
///
/// Cancellation is checked before every record, so a cancel observed
/// mid-page drops the rest of that page and never polls for the next one.
pub fn flatten_pages<S>(pages: S, token: CancellationToken) -> RecordStream
where
    S: Stream<Item = Result<Page>> + Send + 'static,
{
    let records = pages
        .map_ok(|page| stream::iter(page.into_records().into_iter().map(Ok::<Record, Error>)))
        .try_flatten();

    Box::pin(records.take_until(token.cancelled_owned()))
}
