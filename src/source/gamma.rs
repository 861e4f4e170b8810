//! Gamma API client for market listings
//!
//! Reads either the flat `/markets` listing or the nested `/events` listing
//! from Polymarket's Gamma API, and optional price history from the CLOB.
//! Records are returned untouched; shape reconciliation is the normalizer's
//! job.

use super::{FetchError, MarketSource};
use crate::config::{SourceConfig, SourceMode};
use crate::market::{parse_list, RawMarket};
use crate::movement::PriceSample;
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

/// Gamma API base URL
pub const GAMMA_API_URL: &str = "https://gamma-api.polymarket.com";

/// CLOB API base URL
pub const CLOB_API_URL: &str = "https://clob.polymarket.com";

/// Event fields copied onto nested markets that lack them
const INHERITED_EVENT_FIELDS: &[&str] = &["tags", "endDate", "closed", "archived", "active"];

/// Configuration for the Gamma client
#[derive(Debug, Clone)]
pub struct GammaConfig {
    /// Base URL for the Gamma API
    pub base_url: String,
    /// Base URL for the CLOB API
    pub clob_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Endpoint to read
    pub mode: SourceMode,
    /// Records requested per fetch
    pub page_limit: usize,
    /// Price history lookback (e.g. "1d")
    pub history_interval: String,
    /// Price history resolution in minutes
    pub history_fidelity: u32,
}

impl Default for GammaConfig {
    fn default() -> Self {
        Self::from(&SourceConfig::default())
    }
}

impl From<&SourceConfig> for GammaConfig {
    fn from(config: &SourceConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            clob_url: config.clob_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
            mode: config.mode,
            page_limit: config.page_limit,
            history_interval: config.history_interval.clone(),
            history_fidelity: config.history_fidelity,
        }
    }
}

/// Client for Polymarket's Gamma API
pub struct GammaClient {
    config: GammaConfig,
    client: Client,
}

impl GammaClient {
    /// Create a new Gamma API client with default configuration
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(GammaConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: GammaConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GammaConfig {
        &self.config
    }

    /// Fetch active markets from the flat `/markets` listing
    pub async fn fetch_markets(&self) -> Result<Vec<RawMarket>, FetchError> {
        let url = format!("{}/markets", self.config.base_url);
        tracing::debug!(url = %url, "Fetching markets from Gamma API");

        let body = self.get_json(&url, &self.listing_query("volume24hr")).await?;
        let markets: Vec<RawMarket> = extract_records(body, &["data", "markets"])
            .into_iter()
            .map(RawMarket::new)
            .collect();

        tracing::info!(market_count = markets.len(), "Fetched markets");
        Ok(markets)
    }

    /// Fetch active events and flatten their nested markets
    pub async fn fetch_events(&self) -> Result<Vec<RawMarket>, FetchError> {
        let url = format!("{}/events", self.config.base_url);
        tracing::debug!(url = %url, "Fetching events from Gamma API");

        let body = self.get_json(&url, &self.listing_query("volume24hr")).await?;
        let events = extract_records(body, &["data", "events"]);
        let event_count = events.len();
        let markets = flatten_events(events);

        tracing::info!(
            event_count,
            market_count = markets.len(),
            "Fetched events"
        );
        Ok(markets)
    }

    /// Fetch CLOB price history for one outcome token
    pub async fn fetch_price_history(&self, token_id: &str) -> Result<Vec<PriceSample>, FetchError> {
        let url = format!("{}/prices-history", self.config.clob_url);
        let query = vec![
            ("market", token_id.to_string()),
            ("interval", self.config.history_interval.clone()),
            ("fidelity", self.config.history_fidelity.to_string()),
        ];

        let body = self.get_json(&url, &query).await?;
        parse_price_history(body)
    }

    fn listing_query(&self, order: &str) -> Vec<(&'static str, String)> {
        vec![
            ("active", "true".to_string()),
            ("closed", "false".to_string()),
            ("limit", self.config.page_limit.to_string()),
            ("order", order.to_string()),
            ("ascending", "false".to_string()),
        ]
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, FetchError> {
        let timeout = self.config.timeout;
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %truncate(&body, 200), "Upstream request failed");
            return Err(FetchError::from_status(status.as_u16(), retry_after));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::from_reqwest(e, timeout))
    }
}

#[async_trait]
impl MarketSource for GammaClient {
    async fn fetch(&self) -> Result<Vec<RawMarket>, FetchError> {
        match self.config.mode {
            SourceMode::Markets => self.fetch_markets().await,
            SourceMode::Events => self.fetch_events().await,
        }
    }

    async fn price_history(&self, token_id: &str) -> Result<Vec<PriceSample>, FetchError> {
        self.fetch_price_history(token_id).await
    }
}

/// Pull the record list out of a body that is either a bare array or an
/// object wrapping it under one of `keys`
pub fn extract_records(body: Value, keys: &[&str]) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut obj) => keys
            .iter()
            .find_map(|key| match obj.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Flatten event -> markets, copying event-level fields the market lacks
pub fn flatten_events(events: Vec<Value>) -> Vec<RawMarket> {
    events
        .into_iter()
        .filter_map(|event| match event {
            Value::Object(obj) => Some(obj),
            _ => None,
        })
        .flat_map(|event| {
            let markets = event.get("markets").map(parse_list).unwrap_or_default();
            markets
                .into_iter()
                .filter_map(|market| match market {
                    Value::Object(obj) => Some(obj),
                    _ => None,
                })
                .map(|market| RawMarket::new(Value::Object(inherit(market, &event))))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn inherit(mut market: Map<String, Value>, event: &Map<String, Value>) -> Map<String, Value> {
    for field in INHERITED_EVENT_FIELDS {
        let missing = market.get(*field).map_or(true, Value::is_null);
        if missing {
            if let Some(value) = event.get(*field).filter(|v| !v.is_null()) {
                market.insert(field.to_string(), value.clone());
            }
        }
    }
    market
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    history: Vec<HistoryPoint>,
}

#[derive(Debug, Deserialize)]
struct HistoryPoint {
    t: i64,
    p: f64,
}

/// Parse a CLOB `/prices-history` body; unreadable points are skipped
fn parse_price_history(body: Value) -> Result<Vec<PriceSample>, FetchError> {
    let response: HistoryResponse =
        serde_json::from_value(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    Ok(response
        .history
        .into_iter()
        .filter_map(|point| {
            let timestamp = DateTime::from_timestamp(point.t, 0)?;
            let price = Decimal::try_from(point.p).ok()?;
            Some(PriceSample { timestamp, price })
        })
        .collect())
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
