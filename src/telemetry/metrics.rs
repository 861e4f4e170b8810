//! Prometheus metrics

use crate::pipeline::Diagnostics;
use crate::source::FetchError;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Raw records received in the last run
    RecordsIn,
    /// Records chosen by the fallback chain
    RecordsSelected,
    /// Markets published in the last run
    RecordsOut,
    /// Markets estimated from real price history
    WithHistory,
}

impl GaugeMetric {
    fn name(self) -> &'static str {
        match self {
            GaugeMetric::RecordsIn => "polymovers_records_in",
            GaugeMetric::RecordsSelected => "polymovers_records_selected",
            GaugeMetric::RecordsOut => "polymovers_records_out",
            GaugeMetric::WithHistory => "polymovers_markets_with_history",
        }
    }
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(metric.name()).set(value);
}

/// Publish the counters of one pipeline run
pub fn record_pipeline_run(diagnostics: &Diagnostics, elapsed: Duration) {
    set_gauge(GaugeMetric::RecordsIn, diagnostics.records_in as f64);
    set_gauge(GaugeMetric::RecordsSelected, diagnostics.selected as f64);
    set_gauge(GaugeMetric::RecordsOut, diagnostics.records_out as f64);
    set_gauge(GaugeMetric::WithHistory, diagnostics.with_history as f64);

    for tier in &diagnostics.tiers {
        metrics::gauge!("polymovers_tier_matches", "tier" => tier.tier.as_str())
            .set(tier.count as f64);
    }
    if let Some(tier) = diagnostics.selected_tier {
        metrics::counter!("polymovers_tier_selected_total", "tier" => tier.as_str()).increment(1);
    }
    for (reason, count) in diagnostics.dropped.by_reason() {
        if count > 0 {
            metrics::counter!("polymovers_records_dropped_total", "reason" => reason)
                .increment(count as u64);
        }
    }

    metrics::histogram!("polymovers_pipeline_latency_ms").record(elapsed.as_secs_f64() * 1000.0);

    tracing::debug!(
        records_in = diagnostics.records_in,
        records_out = diagnostics.records_out,
        latency_ms = elapsed.as_millis() as u64,
        "Recorded pipeline metrics"
    );
}

/// Count a failed upstream request
pub fn record_fetch_failure(error: &FetchError) {
    metrics::counter!("polymovers_fetch_failures_total", "kind" => error.kind()).increment(1);
}

/// Serve metrics over HTTP on the given port
pub fn install_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    tracing::info!(%addr, "Metrics exporter listening");
    Ok(())
}
