//! Field normalization
//!
//! Converts one raw upstream record into a `NormalizedMarket`. Unreadable
//! sub-fields degrade to defaults; only records without a question or a
//! stable identifier are rejected.

use super::raw::{parse_bool, parse_decimal, RawMarket};
use super::{NormalizedMarket, Token};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields checked, in order, for a 24h volume figure
const VOLUME_FIELDS: &[&str] = &["volume24hr", "volume24h", "volumeNum", "volume"];

/// Fields checked, in order, for a liquidity figure
const LIQUIDITY_FIELDS: &[&str] = &["liquidityNum", "liquidity"];

/// Placeholder volume range used when no real figure exists
const PLACEHOLDER_VOLUME_MIN: i64 = 1_000;
const PLACEHOLDER_VOLUME_MAX: i64 = 100_000;

/// Why a raw record was excluded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// No non-empty `question`
    MissingQuestion,
    /// No usable identifier field
    MissingId,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::MissingQuestion => "missing_question",
            Rejection::MissingId => "missing_id",
        }
    }
}

/// Normalizer behavior switches
#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    /// Substitute a random volume when the record has none
    pub placeholder_volume: bool,
}

/// Normalize one raw record
pub fn normalize<R: Rng + ?Sized>(
    raw: &RawMarket,
    options: &NormalizeOptions,
    rng: &mut R,
) -> Result<NormalizedMarket, Rejection> {
    let question = raw.question().ok_or(Rejection::MissingQuestion)?;
    let id = raw.id().ok_or(Rejection::MissingId)?;

    let (volume_24h, volume_estimated) = match first_positive(raw, VOLUME_FIELDS) {
        Some(volume) => (volume, false),
        None if options.placeholder_volume => (
            Decimal::from(rng.gen_range(PLACEHOLDER_VOLUME_MIN..PLACEHOLDER_VOLUME_MAX)),
            true,
        ),
        None => (Decimal::ZERO, false),
    };

    Ok(NormalizedMarket {
        id,
        question: question.to_string(),
        description: raw.text("description").unwrap_or_default().to_string(),
        slug: raw
            .text("slug")
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        end_date: raw.end_date(),
        closed: raw.is_closed(),
        archived: raw.is_archived(),
        active: raw.is_active(),
        tags: extract_tags(raw),
        tokens: extract_tokens(raw),
        volume_24h,
        liquidity: first_positive(raw, LIQUIDITY_FIELDS).unwrap_or(Decimal::ZERO),
        volume_estimated,
    })
}

fn first_positive(raw: &RawMarket, names: &[&str]) -> Option<Decimal> {
    names
        .iter()
        .map(|name| raw.number(name))
        .find(|n| *n > Decimal::ZERO)
}

/// Tags as lower-cased labels; `"all"` and empty entries are dropped
fn extract_tags(raw: &RawMarket) -> Vec<String> {
    raw.list("tags")
        .iter()
        .filter_map(|tag| match tag {
            Value::String(s) => Some(s.as_str()),
            Value::Object(obj) => obj
                .get("label")
                .and_then(Value::as_str)
                .or_else(|| obj.get("slug").and_then(Value::as_str)),
            _ => None,
        })
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty() && s != "all")
        .collect()
}

/// Outcome tokens from parallel `outcomes`/`outcomePrices` lists, or from a
/// legacy `tokens` array. Always returns at least one token.
fn extract_tokens(raw: &RawMarket) -> Vec<Token> {
    let outcomes = raw.list("outcomes");
    let (tokens, any_priced) = if outcomes.is_empty() {
        legacy_tokens(raw)
    } else {
        paired_tokens(raw, &outcomes)
    };

    if tokens.is_empty() || !any_priced {
        vec![Token::placeholder()]
    } else {
        tokens
    }
}

fn paired_tokens(raw: &RawMarket, outcomes: &[Value]) -> (Vec<Token>, bool) {
    let prices = raw.list("outcomePrices");
    let token_ids = raw.list("clobTokenIds");
    let mut any_priced = false;

    let tokens = outcomes
        .iter()
        .enumerate()
        .map(|(i, outcome)| {
            let price = prices.get(i).and_then(parse_decimal);
            any_priced |= price.is_some();
            Token {
                outcome: value_label(outcome).unwrap_or_else(|| format!("Outcome {}", i + 1)),
                price: clamp_price(price),
                winner: false,
                token_id: token_ids.get(i).and_then(value_label),
            }
        })
        .collect();

    (tokens, any_priced)
}

fn legacy_tokens(raw: &RawMarket) -> (Vec<Token>, bool) {
    let mut any_priced = false;

    let tokens = raw
        .list("tokens")
        .iter()
        .filter_map(Value::as_object)
        .enumerate()
        .map(|(i, obj)| {
            let price = obj.get("price").and_then(parse_decimal);
            any_priced |= price.is_some();
            Token {
                outcome: obj
                    .get("outcome")
                    .and_then(value_label)
                    .unwrap_or_else(|| format!("Outcome {}", i + 1)),
                price: clamp_price(price),
                winner: obj.get("winner").and_then(parse_bool).unwrap_or(false),
                token_id: obj
                    .get("token_id")
                    .or_else(|| obj.get("tokenId"))
                    .and_then(value_label),
            }
        })
        .collect();

    (tokens, any_priced)
}

/// Missing prices become 0.5; parsed prices are clamped into [0, 1]
fn clamp_price(price: Option<Decimal>) -> Decimal {
    price
        .unwrap_or_else(|| Decimal::new(5, 1))
        .clamp(Decimal::ZERO, Decimal::ONE)
}

fn value_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
