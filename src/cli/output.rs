//! Shared output flags and table rendering

use crate::config::MAX_RESOLVING_SOON_HOURS;
use crate::market::{filter_by_category, Market};
use crate::pipeline::{Diagnostics, ProcessOptions};
use clap::Args;
use rust_decimal::Decimal;

const QUESTION_WIDTH: usize = 60;

#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Only show markets in this category
    #[arg(long)]
    pub category: Option<String>,

    /// Maximum markets to show
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Minimum 24h movement
    #[arg(long)]
    pub min_movement: Option<Decimal>,

    /// Minimum 24h volume
    #[arg(long)]
    pub min_volume: Option<Decimal>,

    /// Hide markets resolving within the configured threshold
    #[arg(long)]
    pub exclude_resolving_soon: bool,

    /// Override the resolving-soon threshold in hours
    #[arg(
        long,
        value_parser = clap::value_parser!(u32).range(..=i64::from(MAX_RESOLVING_SOON_HOURS))
    )]
    pub resolving_soon_hours: Option<u32>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl OutputArgs {
    /// Layer command-line overrides on top of configured options
    pub fn apply(&self, mut options: ProcessOptions) -> ProcessOptions {
        if self.exclude_resolving_soon {
            options.exclude_resolving_soon = true;
        }
        if let Some(hours) = self.resolving_soon_hours {
            options.resolving_soon_hours = hours;
        }
        if self.min_movement.is_some() {
            options.min_movement = self.min_movement;
        }
        if self.min_volume.is_some() {
            options.min_volume = self.min_volume;
        }
        if self.limit.is_some() {
            options.limit = self.limit;
        }
        options
    }

    /// Print markets (after the category filter) and a summary line
    pub fn render(&self, markets: &[Market], diagnostics: &Diagnostics) -> anyhow::Result<()> {
        let shown = match &self.category {
            Some(category) => filter_by_category(markets.to_vec(), category),
            None => markets.to_vec(),
        };

        if self.json {
            let body = serde_json::json!({
                "markets": shown,
                "diagnostics": diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
            return Ok(());
        }

        println!("{}", format_table(&shown));
        println!(
            "{} markets shown ({} records in, tier: {})",
            shown.len(),
            diagnostics.records_in,
            diagnostics
                .selected_tier
                .map_or("none", |t| t.as_str())
        );
        Ok(())
    }
}

/// Fixed-width table of markets
pub fn format_table(markets: &[Market]) -> String {
    let mut out = format!(
        "{:>7}  {:>6}  {:>6}  {:>6}  {:>12}  {:<14}  {}",
        "MOVE", "PRICE", "LOW", "HIGH", "VOL 24H", "CATEGORY", "QUESTION"
    );
    for market in markets {
        let volume = if market.info.volume_estimated {
            format!("~{}", market.volume_24h().round_dp(0))
        } else {
            market.volume_24h().round_dp(0).to_string()
        };
        out.push('\n');
        out.push_str(&format!(
            "{:>7}  {:>6}  {:>6}  {:>6}  {:>12}  {:<14}  {}",
            format!("{:.4}", market.movement()),
            format!("{:.4}", market.current_price()),
            format!("{:.4}", market.estimate.low),
            format!("{:.4}", market.estimate.high),
            volume,
            market.category.as_str(),
            ellipsize(market.question(), QUESTION_WIDTH),
        ));
    }
    out
}

fn ellipsize(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
