//! Movers tracker
//!
//! Owns the latest processed result set. Each refresh fetches, processes and
//! replaces the snapshot wholesale; a failed refresh leaves the previous
//! snapshot in place.

use crate::market::{Market, RawMarket};
use crate::pipeline::{Diagnostics, HistoryMap, Pipeline, ProcessOptions};
use crate::source::{FetchError, MarketSource};
use crate::telemetry;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;

/// Latest published result set
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub markets: Vec<Market>,
    pub diagnostics: Diagnostics,
    /// Time of the last successful refresh; `None` before the first
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Tracks the top movers with periodic refresh
pub struct MoversTracker<S: MarketSource> {
    source: S,
    pipeline: Pipeline,
    options: ProcessOptions,
    /// Upper bound on price history lookups per refresh; 0 disables history
    max_history_requests: usize,
    snapshot: Arc<RwLock<Snapshot>>,
}

impl<S: MarketSource> MoversTracker<S> {
    /// Create a new tracker
    pub fn new(source: S, pipeline: Pipeline, options: ProcessOptions) -> Self {
        Self {
            source,
            pipeline,
            options,
            max_history_requests: 0,
            snapshot: Arc::new(RwLock::new(Snapshot::default())),
        }
    }

    /// Look up real price history for up to `max_requests` selected markets
    pub fn with_price_history(mut self, max_requests: usize) -> Self {
        self.max_history_requests = max_requests;
        self
    }

    /// Current snapshot
    pub async fn snapshot(&self) -> Snapshot {
        self.snapshot.read().await.clone()
    }

    /// Fetch, process and publish a new snapshot
    pub async fn refresh(&self) -> Result<Diagnostics, FetchError> {
        let started = Instant::now();

        let raw = match self.source.fetch().await {
            Ok(raw) => raw,
            Err(e) => {
                telemetry::record_fetch_failure(&e);
                return Err(e);
            }
        };

        let history = if self.max_history_requests > 0 {
            self.collect_history(&raw).await
        } else {
            HistoryMap::new()
        };

        let output = self
            .pipeline
            .process_with_history(&raw, &self.options, &history);
        telemetry::record_pipeline_run(&output.diagnostics, started.elapsed());

        tracing::info!(
            records_in = output.diagnostics.records_in,
            selected_tier = ?output.diagnostics.selected_tier,
            records_out = output.diagnostics.records_out,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Refreshed movers"
        );

        let diagnostics = output.diagnostics.clone();
        let mut snapshot = self.snapshot.write().await;
        *snapshot = Snapshot {
            markets: output.markets,
            diagnostics: output.diagnostics,
            refreshed_at: Some(Utc::now()),
        };

        Ok(diagnostics)
    }

    /// Refresh every `period` until `shutdown` resolves. Runs never overlap:
    /// a slow refresh delays the next tick instead of queueing one.
    pub async fn run<F, C>(&self, period: Duration, shutdown: F, mut on_update: C)
    where
        F: Future<Output = ()>,
        C: FnMut(&Snapshot),
    {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Stopping movers tracker");
                    break;
                }
                _ = interval.tick() => {
                    match self.refresh().await {
                        Ok(_) => {
                            let snapshot = self.snapshot.read().await;
                            on_update(&snapshot);
                        }
                        Err(e) => {
                            tracing::warn!(
                                error = %e,
                                kind = e.kind(),
                                "Refresh failed, keeping previous snapshot"
                            );
                        }
                    }
                }
            }
        }
    }

    async fn collect_history(&self, raw: &[RawMarket]) -> HistoryMap {
        let mut history = HistoryMap::new();

        for market in self
            .pipeline
            .selected_markets(raw)
            .into_iter()
            .take(self.max_history_requests)
        {
            let Some(token_id) = market.primary_token().and_then(|t| t.token_id.clone()) else {
                continue;
            };

            match self.source.price_history(&token_id).await {
                Ok(samples) if !samples.is_empty() => {
                    history.insert(market.id, samples);
                }
                Ok(_) => {}
                Err(e @ FetchError::RateLimited { .. }) => {
                    tracing::warn!(error = %e, "Rate limited during history lookup, using spread estimates");
                    telemetry::record_fetch_failure(&e);
                    break;
                }
                Err(e) => {
                    tracing::debug!(market_id = %market.id, error = %e, "History lookup failed");
                    telemetry::record_fetch_failure(&e);
                }
            }
        }

        history
    }
}
