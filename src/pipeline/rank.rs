//! Ranking and ordering

use crate::market::{Market, RawMarket};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Number of relevance keywords contained in the question (case-insensitive)
pub fn topical_score(question: &str, keywords: &[String]) -> usize {
    let question = question.to_lowercase();
    keywords
        .iter()
        .filter(|k| question.contains(k.as_str()))
        .count()
}

/// Sort key for picking keyword-fallback candidates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackKey {
    pub score: usize,
    pub end_date: Option<DateTime<Utc>>,
    pub closed: bool,
}

impl FallbackKey {
    /// `keywords` must already be lower-cased
    pub fn from_raw(raw: &RawMarket, keywords: &[String]) -> Self {
        Self {
            score: raw.question().map_or(0, |q| topical_score(q, keywords)),
            end_date: raw.end_date(),
            closed: raw.is_closed(),
        }
    }

    /// Higher score first, then soonest future end date, then open before
    /// closed. Past or missing end dates rank after any future one.
    pub fn compare(&self, other: &Self, now: DateTime<Utc>) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| compare_end_dates(self.end_date, other.end_date, now))
            .then_with(|| self.closed.cmp(&other.closed))
    }
}

fn compare_end_dates(
    a: Option<DateTime<Utc>>,
    b: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Ordering {
    let future = |d: Option<DateTime<Utc>>| d.filter(|d| *d > now);
    match (future(a), future(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort of raw records into fallback-selection order
pub fn sort_for_fallback<'a>(
    records: &mut Vec<&'a RawMarket>,
    keywords: &[String],
    now: DateTime<Utc>,
) {
    let mut keyed: Vec<(FallbackKey, &'a RawMarket)> = records
        .iter()
        .map(|raw| (FallbackKey::from_raw(raw, keywords), *raw))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| a.compare(b, now));
    *records = keyed.into_iter().map(|(_, raw)| raw).collect();
}

/// Stable sort by movement, largest first
pub fn sort_by_movement(markets: &mut [Market]) {
    markets.sort_by(|a, b| b.movement().cmp(&a.movement()));
}
