//! Scan command implementation

use super::OutputArgs;
use crate::config::Config;
use crate::pipeline::{Pipeline, ProcessOptions};
use crate::source::{GammaClient, GammaConfig};
use crate::tracker::MoversTracker;
use clap::Args;

#[derive(Args, Debug)]
pub struct ScanArgs {
    #[command(flatten)]
    pub output: OutputArgs,
}

impl ScanArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let tracker = build_tracker(config, &self.output)?;

        if let Err(e) = tracker.refresh().await {
            tracing::error!(error = %e, kind = e.kind(), "Scan failed");
            anyhow::bail!(e.user_message());
        }

        let snapshot = tracker.snapshot().await;
        self.output.render(&snapshot.markets, &snapshot.diagnostics)
    }
}

/// Tracker wired to the Gamma API from configuration plus CLI overrides
pub(crate) fn build_tracker(
    config: &Config,
    output: &OutputArgs,
) -> anyhow::Result<MoversTracker<GammaClient>> {
    let client = GammaClient::with_config(GammaConfig::from(&config.source))?;
    let pipeline = Pipeline::new(&config.pipeline);
    let options = output.apply(ProcessOptions::from(&config.filters));

    let tracker = MoversTracker::new(client, pipeline, options);
    Ok(if config.source.use_price_history {
        tracker.with_price_history(config.source.max_history_requests)
    } else {
        tracker
    })
}
