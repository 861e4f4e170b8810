//! Filter tiers and the fallback chain
//!
//! Each tier is an alternative view over the full raw set. The chain returns
//! the first tier that reaches the minimum viable count, or the first
//! non-empty tier when none does.

use super::rank::sort_for_fallback;
use crate::market::RawMarket;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named filter tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierKind {
    /// Open and unarchived
    Strict,
    /// Unarchived, closed allowed
    Relaxed,
    /// Question mentions a relevance keyword
    KeywordFallback,
}

impl TierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TierKind::Strict => "strict",
            TierKind::Relaxed => "relaxed",
            TierKind::KeywordFallback => "keyword_fallback",
        }
    }
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Predicate set for one tier
#[derive(Debug, Clone, PartialEq)]
pub struct TierDescriptor {
    pub kind: TierKind,
    pub require_open: bool,
    pub require_unarchived: bool,
    /// Question must contain a relevance keyword; matches are ordered by
    /// fallback rank
    pub require_keyword: bool,
    /// Maximum records this tier may yield
    pub cap: Option<usize>,
}

impl TierDescriptor {
    pub fn strict() -> Self {
        Self {
            kind: TierKind::Strict,
            require_open: true,
            require_unarchived: true,
            require_keyword: false,
            cap: None,
        }
    }

    pub fn relaxed() -> Self {
        Self {
            kind: TierKind::Relaxed,
            require_open: false,
            require_unarchived: true,
            require_keyword: false,
            cap: None,
        }
    }

    pub fn keyword_fallback(cap: usize) -> Self {
        Self {
            kind: TierKind::KeywordFallback,
            require_open: false,
            require_unarchived: false,
            require_keyword: true,
            cap: Some(cap),
        }
    }

    /// Whether a raw record passes this tier's predicates
    pub fn matches(&self, raw: &RawMarket, keywords: &[String]) -> bool {
        let Some(question) = raw.question() else {
            return false;
        };
        if raw.id().is_none() {
            return false;
        }
        if self.require_open && raw.is_closed() {
            return false;
        }
        if self.require_unarchived && raw.is_archived() {
            return false;
        }
        if self.require_keyword {
            let question = question.to_lowercase();
            return keywords.iter().any(|k| question.contains(k.as_str()));
        }
        true
    }
}

/// How many records a tier matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCount {
    pub tier: TierKind,
    pub count: usize,
}

/// Records chosen by the chain
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    pub records: Vec<&'a RawMarket>,
    /// Tier the records came from; `None` when every tier was empty
    pub tier: Option<TierKind>,
    /// Counts for every tier evaluated, in order
    pub tier_counts: Vec<TierCount>,
}

/// Ordered tiers tried strict-to-loose
#[derive(Debug, Clone)]
pub struct FallbackChain {
    tiers: Vec<TierDescriptor>,
    min_viable: usize,
    keywords: Vec<String>,
}

impl FallbackChain {
    /// Build a chain; keywords are lower-cased and `min_viable` is at least 1
    pub fn new(tiers: Vec<TierDescriptor>, min_viable: usize, keywords: &[String]) -> Self {
        Self {
            tiers,
            min_viable: min_viable.max(1),
            keywords: keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Strict, relaxed, then capped keyword fallback
    pub fn standard(min_viable: usize, keyword_cap: usize, keywords: &[String]) -> Self {
        Self::new(
            vec![
                TierDescriptor::strict(),
                TierDescriptor::relaxed(),
                TierDescriptor::keyword_fallback(keyword_cap),
            ],
            min_viable,
            keywords,
        )
    }

    pub fn tiers(&self) -> &[TierDescriptor] {
        &self.tiers
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Run the chain over the full raw set
    pub fn select<'a>(&self, raw: &'a [RawMarket], now: DateTime<Utc>) -> Selection<'a> {
        let mut tier_counts = Vec::with_capacity(self.tiers.len());
        let mut first_non_empty: Option<(TierKind, Vec<&'a RawMarket>)> = None;

        for tier in &self.tiers {
            let records = self.apply(tier, raw, now);
            tier_counts.push(TierCount {
                tier: tier.kind,
                count: records.len(),
            });

            if records.len() >= self.min_viable {
                return Selection {
                    records,
                    tier: Some(tier.kind),
                    tier_counts,
                };
            }
            if first_non_empty.is_none() && !records.is_empty() {
                first_non_empty = Some((tier.kind, records));
            }
        }

        match first_non_empty {
            Some((kind, records)) => Selection {
                records,
                tier: Some(kind),
                tier_counts,
            },
            None => Selection {
                records: Vec::new(),
                tier: None,
                tier_counts,
            },
        }
    }

    fn apply<'a>(
        &self,
        tier: &TierDescriptor,
        raw: &'a [RawMarket],
        now: DateTime<Utc>,
    ) -> Vec<&'a RawMarket> {
        let mut records: Vec<&'a RawMarket> = raw
            .iter()
            .filter(|r| tier.matches(r, &self.keywords))
            .collect();

        if tier.require_keyword {
            sort_for_fallback(&mut records, &self.keywords, now);
        }
        if let Some(cap) = tier.cap {
            records.truncate(cap);
        }
        records
    }
}
