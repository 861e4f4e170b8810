//! Ingestion pipeline
//!
//! raw records -> fallback chain -> normalize + categorize + estimate ->
//! post-filters -> movement-descending order.

mod diagnostics;
mod rank;
mod tier;

pub use diagnostics::{Diagnostics, DropCounts};
pub use rank::{sort_by_movement, topical_score, FallbackKey};
pub use tier::{FallbackChain, Selection, TierCount, TierDescriptor, TierKind};

use crate::config::{FiltersConfig, PipelineConfig};
use crate::market::{
    normalize, Categorizer, CategoryKeywords, Market, NormalizeOptions, NormalizedMarket,
    RawMarket, Rejection,
};
use crate::movement::{MovementEstimator, PriceSample};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

/// Real price samples keyed by market id
pub type HistoryMap = HashMap<String, Vec<PriceSample>>;

/// Caller-supplied post-filters
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOptions {
    /// Drop markets whose end date is within `resolving_soon_hours` of now
    pub exclude_resolving_soon: bool,
    pub resolving_soon_hours: u32,
    pub min_movement: Option<Decimal>,
    pub min_volume: Option<Decimal>,
    pub limit: Option<usize>,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            exclude_resolving_soon: false,
            resolving_soon_hours: 24,
            min_movement: None,
            min_volume: None,
            limit: None,
        }
    }
}

impl From<&FiltersConfig> for ProcessOptions {
    fn from(config: &FiltersConfig) -> Self {
        Self {
            exclude_resolving_soon: config.exclude_resolving_soon,
            resolving_soon_hours: config.resolving_soon_hours,
            min_movement: config.min_movement,
            min_volume: config.min_volume,
            limit: config.limit,
        }
    }
}

/// Markets in presentation order plus run diagnostics
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub markets: Vec<Market>,
    pub diagnostics: Diagnostics,
}

/// Configured ingestion pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    chain: FallbackChain,
    categorizer: Categorizer,
    estimator: MovementEstimator,
    normalize_options: NormalizeOptions,
    seed: Option<u64>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

impl Pipeline {
    /// Build a pipeline from configuration
    pub fn new(config: &PipelineConfig) -> Self {
        let keywords = match &config.categories {
            Some(rules) => CategoryKeywords::from_rules(rules),
            None => CategoryKeywords::default(),
        };

        Self {
            chain: FallbackChain::standard(
                config.min_viable_results,
                config.keyword_fallback_cap,
                &config.relevance_keywords,
            ),
            categorizer: Categorizer::new(keywords),
            estimator: MovementEstimator::new(config.synthetic_jitter),
            normalize_options: NormalizeOptions {
                placeholder_volume: config.placeholder_volume,
            },
            seed: config.seed,
        }
    }

    /// Replace the fallback chain
    pub fn with_chain(mut self, chain: FallbackChain) -> Self {
        self.chain = chain;
        self
    }

    pub fn chain(&self) -> &FallbackChain {
        &self.chain
    }

    /// Run the fallback chain only
    pub fn select<'a>(&self, raw: &'a [RawMarket]) -> Selection<'a> {
        self.chain.select(raw, Utc::now())
    }

    /// Normalize the chain's selection without estimating movement.
    /// Used to decide which markets need price history.
    pub fn selected_markets(&self, raw: &[RawMarket]) -> Vec<NormalizedMarket> {
        let mut rng = self.rng();
        self.select(raw)
            .records
            .into_iter()
            .filter_map(|r| normalize(r, &self.normalize_options, &mut rng).ok())
            .collect()
    }

    /// Process raw records with spread-based movement estimates
    pub fn process(&self, raw: &[RawMarket], options: &ProcessOptions) -> PipelineOutput {
        self.process_at(raw, options, &HistoryMap::new(), Utc::now())
    }

    /// Process raw records, using real history where available
    pub fn process_with_history(
        &self,
        raw: &[RawMarket],
        options: &ProcessOptions,
        history: &HistoryMap,
    ) -> PipelineOutput {
        self.process_at(raw, options, history, Utc::now())
    }

    /// Process with an explicit "now" for the resolving-soon filter and
    /// fallback ranking
    pub fn process_at(
        &self,
        raw: &[RawMarket],
        options: &ProcessOptions,
        history: &HistoryMap,
        now: DateTime<Utc>,
    ) -> PipelineOutput {
        let mut diagnostics = Diagnostics {
            records_in: raw.len(),
            ..Default::default()
        };
        count_rejections(raw, &mut diagnostics.dropped);

        let selection = self.chain.select(raw, now);
        diagnostics.tiers = selection.tier_counts.clone();
        diagnostics.selected_tier = selection.tier;
        diagnostics.selected = selection.records.len();

        let mut rng = self.rng();
        let mut seen = HashSet::new();
        let mut markets = Vec::with_capacity(selection.records.len());

        for record in selection.records {
            let Ok(info) = normalize(record, &self.normalize_options, &mut rng) else {
                continue;
            };
            if !seen.insert(info.id.clone()) {
                diagnostics.dropped.duplicate_id += 1;
                continue;
            }

            let samples = history.get(&info.id).map(Vec::as_slice);
            if samples.is_some() {
                diagnostics.with_history += 1;
            }
            let category = self.categorizer.categorize(&info);
            let estimate = self.estimator.estimate(&info, samples, &mut rng);
            debug_assert!(estimate.is_consistent());

            markets.push(Market {
                info,
                category,
                estimate,
            });
        }
        diagnostics.processed = markets.len();

        let mut markets = apply_post_filters(markets, options, now, &mut diagnostics.dropped);
        sort_by_movement(&mut markets);
        if let Some(limit) = options.limit {
            if markets.len() > limit {
                diagnostics.dropped.over_limit += markets.len() - limit;
                markets.truncate(limit);
            }
        }
        diagnostics.records_out = markets.len();

        tracing::debug!(
            records_in = diagnostics.records_in,
            selected_tier = ?diagnostics.selected_tier,
            selected = diagnostics.selected,
            records_out = diagnostics.records_out,
            "Pipeline run complete"
        );

        PipelineOutput {
            markets,
            diagnostics,
        }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

fn count_rejections(raw: &[RawMarket], dropped: &mut DropCounts) {
    for record in raw {
        match rejection_reason(record) {
            Some(Rejection::MissingQuestion) => dropped.missing_question += 1,
            Some(Rejection::MissingId) => dropped.missing_id += 1,
            None => {}
        }
    }
}

fn apply_post_filters(
    markets: Vec<Market>,
    options: &ProcessOptions,
    now: DateTime<Utc>,
    dropped: &mut DropCounts,
) -> Vec<Market> {
    let horizon = now
        .checked_add_signed(Duration::hours(i64::from(options.resolving_soon_hours)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    markets
        .into_iter()
        .filter(|m| {
            if options.exclude_resolving_soon && m.end_date().is_some_and(|end| end <= horizon) {
                dropped.resolving_soon += 1;
                return false;
            }
            if options.min_movement.is_some_and(|min| m.movement() < min) {
                dropped.below_min_movement += 1;
                return false;
            }
            if options.min_volume.is_some_and(|min| m.volume_24h() < min) {
                dropped.below_min_volume += 1;
                return false;
            }
            true
        })
        .collect()
}

/// Reason a record would be rejected by the normalizer, if any
pub fn rejection_reason(raw: &RawMarket) -> Option<Rejection> {
    if raw.question().is_none() {
        Some(Rejection::MissingQuestion)
    } else if raw.id().is_none() {
        Some(Rejection::MissingId)
    } else {
        None
    }
}
