//! Process command implementation

use super::OutputArgs;
use crate::config::Config;
use crate::market::RawMarket;
use crate::pipeline::{Pipeline, ProcessOptions};
use crate::source::{extract_records, flatten_events};
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// JSON file holding a market list (or an event list with --events)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Treat the input as events with nested markets
    #[arg(long)]
    pub events: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl ProcessArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let content = std::fs::read_to_string(&self.input)
            .with_context(|| format!("Failed to read {}", self.input.display()))?;
        let body: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", self.input.display()))?;

        let raw = load_records(body, self.events);
        tracing::info!(records = raw.len(), input = %self.input.display(), "Processing local dump");

        let pipeline = Pipeline::new(&config.pipeline);
        let options = self.output.apply(ProcessOptions::from(&config.filters));
        let output = pipeline.process(&raw, &options);

        self.output.render(&output.markets, &output.diagnostics)
    }
}

fn load_records(body: serde_json::Value, events: bool) -> Vec<RawMarket> {
    if events {
        flatten_events(extract_records(body, &["data", "events"]))
    } else {
        extract_records(body, &["data", "markets"])
            .into_iter()
            .map(RawMarket::new)
            .collect()
    }
}
