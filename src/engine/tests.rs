//! Tests for engine module

use super::*;
use crate::error::Error;
use crate::stream::FilterStage;
use crate::test_support::{beer, ScriptedFetcher, Step};
use futures::StreamExt;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn reference_pages() -> Vec<Vec<Record>> {
    vec![
        vec![beer("a", 5.0), beer("b", 7.2)],
        vec![beer("c", 9.9), beer("d", 3.0)],
    ]
}

fn names(records: &[Record]) -> Vec<String> {
    records.iter().map(|r| r.name.clone()).collect()
}

// ============================================================================
// Outcome Tests
// ============================================================================

#[test]
fn test_outcome_accessors() {
    let complete = Outcome::Complete(vec![beer("a", 8.0)]);
    assert!(!complete.is_cancelled());
    assert_eq!(complete.into_records().map(|r| r.len()), Some(1));

    assert!(Outcome::Cancelled.is_cancelled());
    assert_eq!(Outcome::Cancelled.into_records(), None);
}

// ============================================================================
// Pipeline Tests
// ============================================================================

#[tokio::test]
async fn test_building_pipeline_does_no_work() {
    let fetcher = Arc::new(ScriptedFetcher::pages(reference_pages()));
    let pipeline = Pipeline::new(fetcher.clone(), FilterStage::abv_above(7.0));
    let _subscription = pipeline.subscribe(CancellationToken::new());

    tokio::task::yield_now().await;
    assert!(fetcher.requested().is_empty());
}

#[tokio::test]
async fn test_collect_filters_in_order() {
    let fetcher = Arc::new(ScriptedFetcher::pages(reference_pages()));
    let pipeline = Pipeline::new(fetcher.clone(), FilterStage::abv_above(7.0));

    let outcome = pipeline.collect(CancellationToken::new()).await.unwrap();
    let records = outcome.into_records().unwrap();

    assert_eq!(names(&records), vec!["b", "c"]);
    assert_eq!(fetcher.requested(), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_each_subscription_starts_fresh() {
    let fetcher = Arc::new(ScriptedFetcher::pages(reference_pages()));
    let pipeline = Pipeline::new(fetcher.clone(), FilterStage::abv_above(7.0));

    let first = pipeline.collect(CancellationToken::new()).await.unwrap();
    let second = pipeline.collect(CancellationToken::new()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(fetcher.requested(), vec![1, 2, 3, 1, 2, 3]);
}

#[tokio::test]
async fn test_collect_never_returns_partial_results_on_failure() {
    let fetcher = Arc::new(ScriptedFetcher::new(vec![
        Step::Records(vec![beer("strong", 9.0)]),
        Step::Status(500),
    ]));
    let pipeline = Pipeline::new(fetcher.clone(), FilterStage::abv_above(7.0));

    let err = pipeline.collect(CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
    assert_eq!(fetcher.requested(), vec![1, 2]);
}

#[tokio::test]
async fn test_collect_cancelled_returns_no_records() {
    let fetcher = Arc::new(
        ScriptedFetcher::pages(reference_pages()).with_delay(Duration::from_secs(30)),
    );
    let pipeline = Pipeline::new(fetcher.clone(), FilterStage::abv_above(7.0));
    let token = CancellationToken::new();

    let worker = pipeline.spawn_collect(token.clone());
    tokio::time::sleep(Duration::from_millis(20)).await;
    token.cancel();

    let outcome = tokio::time::timeout(Duration::from_secs(5), worker)
        .await
        .expect("worker should stop promptly")
        .unwrap()
        .unwrap();

    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(fetcher.requested(), vec![1]);
}

#[tokio::test]
async fn test_spawn_collect_completes() {
    let fetcher = Arc::new(ScriptedFetcher::pages(reference_pages()));
    let pipeline = Pipeline::new(fetcher, FilterStage::pass_all());

    let outcome = pipeline
        .spawn_collect(CancellationToken::new())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(outcome.into_records().unwrap().len(), 4);
}

// ============================================================================
// Subscription Tests
// ============================================================================

#[tokio::test]
async fn test_subscription_stats() {
    let fetcher = Arc::new(ScriptedFetcher::pages(reference_pages()));
    let pipeline = Pipeline::new(fetcher, FilterStage::abv_above(7.0));
    let mut subscription = pipeline.subscribe(CancellationToken::new());

    while let Some(record) = subscription.next().await {
        record.unwrap();
    }

    let stats = subscription.stats();
    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(stats.records_seen, 4);
    assert_eq!(stats.records_matched, 2);
    assert_eq!(subscription.finish_reason(), Some(FinishReason::Completed));
}

#[tokio::test]
async fn test_subscription_limit_stops_fetching() {
    let fetcher = Arc::new(ScriptedFetcher::pages(vec![
        vec![beer("a", 8.0), beer("b", 8.5)],
        vec![beer("c", 9.0)],
    ]));
    let pipeline = Pipeline::new(fetcher.clone(), FilterStage::pass_all()).with_limit(1);
    let token = CancellationToken::new();

    let outcome = pipeline.collect(token.clone()).await.unwrap();

    assert_eq!(names(&outcome.into_records().unwrap()), vec!["a"]);
    assert_eq!(fetcher.requested(), vec![1]);
    // The caller's token is left alone
    assert!(!token.is_cancelled());
}

#[tokio::test]
async fn test_subscription_cancel_after_first_record() {
    let fetcher = Arc::new(ScriptedFetcher::pages(reference_pages()));
    let pipeline = Pipeline::new(fetcher.clone(), FilterStage::pass_all());
    let mut subscription = pipeline.subscribe(CancellationToken::new());

    assert_eq!(subscription.next().await.unwrap().unwrap().name, "a");
    subscription.cancel();

    assert!(subscription.next().await.is_none());
    assert_eq!(subscription.finish_reason(), Some(FinishReason::Cancelled));
    assert_eq!(fetcher.requested(), vec![1]);
}

#[tokio::test]
async fn test_subscription_error_is_terminal() {
    let fetcher = Arc::new(ScriptedFetcher::new(vec![
        Step::Records(vec![beer("a", 8.0)]),
        Step::Malformed,
        Step::Records(vec![beer("c", 9.0)]),
    ]));
    let pipeline = Pipeline::new(fetcher.clone(), FilterStage::pass_all());
    let mut subscription = pipeline.subscribe(CancellationToken::new());

    assert!(subscription.next().await.unwrap().is_ok());
    assert!(subscription.next().await.unwrap().unwrap_err().is_decode());
    assert!(subscription.next().await.is_none());
    assert_eq!(subscription.finish_reason(), Some(FinishReason::Failed));
    assert_eq!(fetcher.requested(), vec![1, 2]);
}

#[tokio::test]
async fn test_at_most_one_fetch_in_flight() {
    let fetcher = Arc::new(
        ScriptedFetcher::pages(reference_pages()).with_delay(Duration::from_secs(30)),
    );
    let pipeline = Pipeline::new(fetcher.clone(), FilterStage::pass_all());
    let mut subscription = pipeline.subscribe(CancellationToken::new());

    let mut next = tokio_test::task::spawn(subscription.next());
    tokio_test::assert_pending!(next.poll());
    tokio_test::assert_pending!(next.poll());
    drop(next);

    assert_eq!(fetcher.requested(), vec![1]);
}

#[tokio::test]
async fn test_parent_token_cancels_subscription() {
    let fetcher = Arc::new(ScriptedFetcher::pages(reference_pages()));
    let pipeline = Pipeline::new(fetcher.clone(), FilterStage::pass_all());
    let parent = CancellationToken::new();
    let mut subscription = pipeline.subscribe(parent.clone());

    parent.cancel();

    assert!(subscription.token().is_cancelled());
    assert!(subscription.next().await.is_none());
    assert!(fetcher.requested().is_empty());
}

#[tokio::test]
async fn test_zero_limit_fetches_nothing() {
    let fetcher = Arc::new(ScriptedFetcher::pages(reference_pages()));
    let pipeline = Pipeline::new(fetcher.clone(), FilterStage::pass_all()).with_limit(0);

    let outcome = pipeline.collect(CancellationToken::new()).await.unwrap();

    assert_eq!(outcome, Outcome::Complete(vec![]));
    assert!(fetcher.requested().is_empty());

    let mut subscription = pipeline.subscribe(CancellationToken::new());
    assert!(subscription.next().await.is_none());
    assert_eq!(subscription.finish_reason(), Some(FinishReason::LimitReached));
}
