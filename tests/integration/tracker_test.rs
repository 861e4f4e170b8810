//! Integration tests for the movers tracker

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use poly_movers::market::RawMarket;
use poly_movers::movement::PriceSample;
use poly_movers::pipeline::{Pipeline, ProcessOptions};
use poly_movers::source::{FetchError, MarketSource};
use poly_movers::tracker::MoversTracker;
use rust_decimal_macros::dec;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Source replaying canned responses; repeats the last one when exhausted
struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Vec<RawMarket>, FetchError>>>,
    history_calls: Arc<AtomicUsize>,
}

impl ScriptedSource {
    fn new(responses: Vec<Result<Vec<RawMarket>, FetchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            history_calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl MarketSource for ScriptedSource {
    async fn fetch(&self) -> Result<Vec<RawMarket>, FetchError> {
        let mut responses = self.responses.lock().unwrap();
        if responses.len() > 1 {
            responses.pop_front().unwrap()
        } else {
            responses.front().cloned().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    async fn price_history(&self, token_id: &str) -> Result<Vec<PriceSample>, FetchError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        if token_id != "yes-1" {
            return Ok(Vec::new());
        }
        let base = Utc::now() - ChronoDuration::hours(12);
        Ok(vec![
            PriceSample {
                timestamp: base,
                price: dec!(0.25),
            },
            PriceSample {
                timestamp: base + ChronoDuration::hours(6),
                price: dec!(0.55),
            },
        ])
    }
}

fn market(id: &str, question: &str) -> RawMarket {
    RawMarket::new(json!({
        "id": id,
        "question": question,
        "outcomes": ["Yes", "No"],
        "outcomePrices": ["0.5", "0.5"],
        "clobTokenIds": [format!("yes-{id}"), format!("no-{id}")]
    }))
}

#[tokio::test]
async fn test_snapshot_empty_before_refresh() {
    let tracker = MoversTracker::new(
        ScriptedSource::new(vec![]),
        Pipeline::default(),
        ProcessOptions::default(),
    );
    let snapshot = tracker.snapshot().await;
    assert!(snapshot.markets.is_empty());
    assert!(snapshot.refreshed_at.is_none());
}

#[tokio::test]
async fn test_refresh_replaces_snapshot() {
    let source = ScriptedSource::new(vec![
        Ok(vec![market("1", "A"), market("2", "B")]),
        Ok(vec![market("3", "C")]),
    ]);
    let tracker = MoversTracker::new(source, Pipeline::default(), ProcessOptions::default());

    let diagnostics = tracker.refresh().await.unwrap();
    assert_eq!(diagnostics.records_out, 2);

    tracker.refresh().await.unwrap();
    let snapshot = tracker.snapshot().await;
    let ids: Vec<&str> = snapshot.markets.iter().map(|m| m.id()).collect();
    assert_eq!(ids, vec!["3"]);
    assert!(snapshot.refreshed_at.is_some());
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_snapshot() {
    let source = ScriptedSource::new(vec![
        Ok(vec![market("1", "A")]),
        Err(FetchError::RateLimited {
            retry_after_secs: Some(5),
        }),
    ]);
    let tracker = MoversTracker::new(source, Pipeline::default(), ProcessOptions::default());

    tracker.refresh().await.unwrap();
    let before = tracker.snapshot().await;

    let err = tracker.refresh().await.unwrap_err();
    assert_eq!(err.kind(), "rate_limited");

    let after = tracker.snapshot().await;
    assert_eq!(after.markets, before.markets);
    assert_eq!(after.refreshed_at, before.refreshed_at);
}

#[tokio::test]
async fn test_empty_upstream_is_not_an_error() {
    let tracker = MoversTracker::new(
        ScriptedSource::new(vec![Ok(vec![])]),
        Pipeline::default(),
        ProcessOptions::default(),
    );
    let diagnostics = tracker.refresh().await.unwrap();
    assert_eq!(diagnostics.records_out, 0);
    assert!(tracker.snapshot().await.refreshed_at.is_some());
}

#[tokio::test]
async fn test_price_history_feeds_estimator() {
    let source = ScriptedSource::new(vec![Ok(vec![market("1", "A"), market("2", "B")])]);
    let calls = Arc::clone(&source.history_calls);
    let tracker = MoversTracker::new(source, Pipeline::default(), ProcessOptions::default())
        .with_price_history(10);

    let diagnostics = tracker.refresh().await.unwrap();
    assert_eq!(diagnostics.with_history, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let snapshot = tracker.snapshot().await;
    let first = snapshot.markets.iter().find(|m| m.id() == "1").unwrap();
    assert_eq!(first.current_price(), dec!(0.55));
    assert_eq!(first.movement(), dec!(0.30));
}

#[tokio::test]
async fn test_history_request_cap() {
    let source = ScriptedSource::new(vec![Ok(vec![market("1", "A"), market("2", "B")])]);
    let calls = Arc::clone(&source.history_calls);
    let tracker = MoversTracker::new(source, Pipeline::default(), ProcessOptions::default())
        .with_price_history(1);

    tracker.refresh().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_run_until_shutdown() {
    let tracker = MoversTracker::new(
        ScriptedSource::new(vec![Ok(vec![market("1", "A")])]),
        Pipeline::default(),
        ProcessOptions::default(),
    );
    let mut updates = 0;

    tracker
        .run(
            Duration::from_millis(10),
            tokio::time::sleep(Duration::from_millis(100)),
            |snapshot| {
                assert_eq!(snapshot.markets.len(), 1);
                updates += 1;
            },
        )
        .await;

    assert!(updates >= 1);
}
