//! Per-run pipeline diagnostics

use super::tier::{TierCount, TierKind};
use serde::{Deserialize, Serialize};

/// Records dropped, by reason
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropCounts {
    /// Input records without a usable question
    pub missing_question: usize,
    /// Input records with a question but no identifier
    pub missing_id: usize,
    /// Selected records repeating an id already seen in the run
    pub duplicate_id: usize,
    pub resolving_soon: usize,
    pub below_min_movement: usize,
    pub below_min_volume: usize,
    /// Cut by the result limit
    pub over_limit: usize,
}

impl DropCounts {
    pub fn total(&self) -> usize {
        self.missing_question
            + self.missing_id
            + self.duplicate_id
            + self.resolving_soon
            + self.below_min_movement
            + self.below_min_volume
            + self.over_limit
    }

    /// (reason, count) pairs for metric labels
    pub fn by_reason(&self) -> [(&'static str, usize); 7] {
        [
            ("missing_question", self.missing_question),
            ("missing_id", self.missing_id),
            ("duplicate_id", self.duplicate_id),
            ("resolving_soon", self.resolving_soon),
            ("below_min_movement", self.below_min_movement),
            ("below_min_volume", self.below_min_volume),
            ("over_limit", self.over_limit),
        ]
    }
}

/// Counters describing one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub records_in: usize,
    /// Match counts for each tier evaluated, in order
    pub tiers: Vec<TierCount>,
    pub selected_tier: Option<TierKind>,
    pub selected: usize,
    /// Markets that went through estimation
    pub processed: usize,
    pub dropped: DropCounts,
    pub records_out: usize,
    /// Markets whose movement came from real price history
    pub with_history: usize,
}

impl Diagnostics {
    /// Count for a given tier, if it was evaluated
    pub fn tier_count(&self, tier: TierKind) -> Option<usize> {
        self.tiers.iter().find(|t| t.tier == tier).map(|t| t.count)
    }
}
