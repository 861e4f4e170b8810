//! Configuration types for poly-movers

use crate::market::CategoryRule;
use crate::source::{CLOB_API_URL, GAMMA_API_URL};
use crate::telemetry::LogFormat;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Upper bound for `filters.resolving_soon_hours` (ten years)
pub const MAX_RESOLVING_SOON_HOURS: u32 = 24 * 365 * 10;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Upstream data source configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Gamma API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// CLOB API base URL (price history)
    #[serde(default = "default_clob_url")]
    pub clob_url: String,

    /// Request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Flat market list or nested events
    #[serde(default)]
    pub mode: SourceMode,

    /// Records requested per fetch
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,

    /// Look up real price history for selected markets
    #[serde(default)]
    pub use_price_history: bool,

    /// History lookback passed to the CLOB (e.g. "1d")
    #[serde(default = "default_history_interval")]
    pub history_interval: String,

    /// History resolution in minutes
    #[serde(default = "default_history_fidelity")]
    pub history_fidelity: u32,

    /// Upper bound on history requests per refresh
    #[serde(default = "default_max_history_requests")]
    pub max_history_requests: usize,
}

/// Which Gamma endpoint to read
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    #[default]
    Markets,
    Events,
}

fn default_base_url() -> String {
    GAMMA_API_URL.to_string()
}
fn default_clob_url() -> String {
    CLOB_API_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_page_limit() -> usize {
    500
}
fn default_history_interval() -> String {
    "1d".to_string()
}
fn default_history_fidelity() -> u32 {
    60
}
fn default_max_history_requests() -> usize {
    25
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            clob_url: default_clob_url(),
            timeout_secs: default_timeout_secs(),
            mode: SourceMode::Markets,
            page_limit: default_page_limit(),
            use_price_history: false,
            history_interval: default_history_interval(),
            history_fidelity: default_history_fidelity(),
            max_history_requests: default_max_history_requests(),
        }
    }
}

/// Ingestion pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// A tier is accepted once it yields at least this many records
    #[serde(default = "default_min_viable_results")]
    pub min_viable_results: usize,

    /// Maximum records taken from the keyword fallback tier
    #[serde(default = "default_keyword_fallback_cap")]
    pub keyword_fallback_cap: usize,

    /// "Currently relevant" keywords for the fallback tier and its ranking
    #[serde(default = "default_relevance_keywords")]
    pub relevance_keywords: Vec<String>,

    /// Randomize spread-based movement estimates
    #[serde(default = "default_true")]
    pub synthetic_jitter: bool,

    /// Fill missing volume with a random placeholder
    #[serde(default)]
    pub placeholder_volume: bool,

    /// Seed for jitter and placeholders; entropy when unset
    #[serde(default)]
    pub seed: Option<u64>,

    /// Replaces the built-in categorization keyword table
    #[serde(default)]
    pub categories: Option<Vec<CategoryRule>>,
}

fn default_true() -> bool {
    true
}
fn default_min_viable_results() -> usize {
    1
}
fn default_keyword_fallback_cap() -> usize {
    50
}
fn default_relevance_keywords() -> Vec<String> {
    [
        "2026", "2027", "today", "tomorrow", "this week", "this month", "election", "trump",
        "bitcoin", "ethereum", "fed", "rate cut", "super bowl", "world cup", "champion", "openai",
    ]
    .iter()
    .map(|k| k.to_string())
    .collect()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_viable_results: default_min_viable_results(),
            keyword_fallback_cap: default_keyword_fallback_cap(),
            relevance_keywords: default_relevance_keywords(),
            synthetic_jitter: true,
            placeholder_volume: false,
            seed: None,
            categories: None,
        }
    }
}

/// Post-filters applied to processed markets
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FiltersConfig {
    /// Drop markets resolving within `resolving_soon_hours`
    #[serde(default)]
    pub exclude_resolving_soon: bool,

    #[serde(default = "default_resolving_soon_hours")]
    pub resolving_soon_hours: u32,

    #[serde(default)]
    pub min_movement: Option<Decimal>,

    #[serde(default)]
    pub min_volume: Option<Decimal>,

    /// Maximum markets returned
    #[serde(default)]
    pub limit: Option<usize>,
}

fn default_resolving_soon_hours() -> u32 {
    24
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            exclude_resolving_soon: false,
            resolving_soon_hours: default_resolving_soon_hours(),
            min_movement: None,
            min_volume: None,
            limit: None,
        }
    }
}

/// Periodic refresh configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_interval_secs() -> u64 {
    60
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Prometheus exporter port; no exporter when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline or source cannot work with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.source.timeout_secs == 0 {
            anyhow::bail!("source.timeout_secs must be greater than zero");
        }
        if self.source.page_limit == 0 {
            anyhow::bail!("source.page_limit must be greater than zero");
        }
        if self.pipeline.keyword_fallback_cap == 0 {
            anyhow::bail!("pipeline.keyword_fallback_cap must be greater than zero");
        }
        if self.refresh.interval_secs == 0 {
            anyhow::bail!("refresh.interval_secs must be greater than zero");
        }
        if self.filters.resolving_soon_hours > MAX_RESOLVING_SOON_HOURS {
            anyhow::bail!(
                "filters.resolving_soon_hours must be at most {}",
                MAX_RESOLVING_SOON_HOURS
            );
        }
        if matches!(self.filters.min_movement, Some(m) if m < Decimal::ZERO) {
            anyhow::bail!("filters.min_movement must not be negative");
        }
        if matches!(self.filters.min_volume, Some(v) if v < Decimal::ZERO) {
            anyhow::bail!("filters.min_volume must not be negative");
        }
        Ok(())
    }
}
