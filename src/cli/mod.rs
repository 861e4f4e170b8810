//! CLI interface for poly-movers
//!
//! Provides subcommands for:
//! - `scan`: Fetch once and print the top movers
//! - `watch`: Refresh on an interval until Ctrl-C
//! - `process`: Run the pipeline over a local JSON dump
//! - `config`: Show the effective configuration

mod output;
mod process;
mod scan;
mod watch;

pub use output::OutputArgs;
pub use process::ProcessArgs;
pub use scan::ScanArgs;
pub use watch::WatchArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "poly-movers")]
#[command(about = "Rank Polymarket prediction markets by 24h price movement")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch once and print the top movers
    Scan(ScanArgs),
    /// Refresh periodically until interrupted
    Watch(WatchArgs),
    /// Process a local JSON dump of market records
    Process(ProcessArgs),
    /// Show configuration
    Config,
}
