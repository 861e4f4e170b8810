//! Market model
//!
//! Canonical market representation plus the per-record stages that build it:
//! field normalization and categorization.

mod category;
mod normalize;
mod raw;

pub use category::{Categorizer, Category, CategoryKeywords, CategoryRule};
pub use normalize::{normalize, NormalizeOptions, Rejection};
pub use raw::{parse_decimal, parse_list, parse_timestamp, RawMarket};

use crate::movement::MovementEstimate;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One outcome of a market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Outcome label (e.g. "Yes")
    pub outcome: String,
    /// Probability-like price in [0, 1]
    pub price: Decimal,
    /// Whether this outcome resolved as the winner
    pub winner: bool,
    /// CLOB token identifier, when the upstream supplies one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
}

impl Token {
    /// Placeholder token used when a record carries no priced outcomes
    pub fn placeholder() -> Self {
        Self {
            outcome: "Yes".to_string(),
            price: Decimal::new(5, 1),
            winner: false,
            token_id: None,
        }
    }
}

/// Typed market fields produced by the normalizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMarket {
    pub id: String,
    pub question: String,
    pub description: String,
    pub slug: Option<String>,
    pub end_date: Option<DateTime<Utc>>,
    pub closed: bool,
    pub archived: bool,
    pub active: bool,
    pub tags: Vec<String>,
    /// Never empty
    pub tokens: Vec<Token>,
    pub volume_24h: Decimal,
    pub liquidity: Decimal,
    /// True when `volume_24h` is a placeholder rather than an upstream figure
    pub volume_estimated: bool,
}

impl NormalizedMarket {
    /// The token treated as the market's primary ("Yes"-like) outcome
    pub fn primary_token(&self) -> Option<&Token> {
        self.tokens
            .iter()
            .find(|t| {
                let outcome = t.outcome.to_lowercase();
                outcome.contains("yes") || outcome.contains("win")
            })
            .or_else(|| self.tokens.first())
    }
}

/// A fully processed market: normalized fields, category and movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    #[serde(flatten)]
    pub info: NormalizedMarket,
    pub category: Category,
    #[serde(flatten)]
    pub estimate: MovementEstimate,
}

impl Market {
    pub fn id(&self) -> &str {
        &self.info.id
    }

    pub fn question(&self) -> &str {
        &self.info.question
    }

    pub fn movement(&self) -> Decimal {
        self.estimate.movement
    }

    pub fn current_price(&self) -> Decimal {
        self.estimate.current_price
    }

    pub fn volume_24h(&self) -> Decimal {
        self.info.volume_24h
    }

    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.info.end_date
    }
}

/// Keep only markets in the given category (case-insensitive)
pub fn filter_by_category(markets: Vec<Market>, category: &str) -> Vec<Market> {
    let wanted = category.trim().to_lowercase();
    if wanted.is_empty() || wanted == "all" {
        return markets;
    }
    markets
        .into_iter()
        .filter(|m| m.category.as_str() == wanted)
        .collect()
}
