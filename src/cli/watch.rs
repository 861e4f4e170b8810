//! Watch command implementation

use super::scan::build_tracker;
use super::OutputArgs;
use crate::config::Config;
use clap::Args;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Refresh interval in seconds (overrides config)
    #[arg(short, long)]
    pub interval: Option<u64>,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl WatchArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let secs = self.interval.unwrap_or(config.refresh.interval_secs).max(1);
        let tracker = build_tracker(config, &self.output)?;

        tracing::info!(interval_secs = secs, "Watching top movers");

        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            }
        };

        tracker
            .run(Duration::from_secs(secs), shutdown, |snapshot| {
                if let Err(e) = self.output.render(&snapshot.markets, &snapshot.diagnostics) {
                    tracing::warn!(error = %e, "Failed to render snapshot");
                }
            })
            .await;

        Ok(())
    }
}
