//! Movement estimator
//!
//! History mode is authoritative when samples exist. Otherwise the spread
//! between outcome prices drives a bounded pseudo-range around the current
//! price. The upstream only exposes point-in-time prices, so the spread
//! estimate is a stand-in, not a real OHLC range.

use super::MovementEstimate;
use crate::market::NormalizedMarket;
use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Spread assumed when fewer than two tokens are priced
const DEFAULT_TOKEN_SPREAD: Decimal = dec!(0.1);
/// Spread multiplier for the pseudo-variation
const SPREAD_FACTOR: Decimal = dec!(1.5);
const MIN_VARIATION: Decimal = dec!(0.05);
const MAX_VARIATION: Decimal = dec!(0.20);
/// Jitter draws a fraction of the variation from [0.5, 1.0] in 1e-4 steps
const JITTER_MIN_BPS: i64 = 5_000;
const JITTER_MAX_BPS: i64 = 10_000;

/// One timestamped observation of the primary outcome price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
}

/// Computes `MovementEstimate`s
#[derive(Debug, Clone)]
pub struct MovementEstimator {
    /// Randomize the spread estimate; when off the range sits at half the
    /// variation on each side
    synthetic_jitter: bool,
}

impl Default for MovementEstimator {
    fn default() -> Self {
        Self::new(true)
    }
}

impl MovementEstimator {
    pub fn new(synthetic_jitter: bool) -> Self {
        Self { synthetic_jitter }
    }

    /// Estimate from history when supplied, else from the token spread
    pub fn estimate<R: Rng + ?Sized>(
        &self,
        market: &NormalizedMarket,
        history: Option<&[PriceSample]>,
        rng: &mut R,
    ) -> MovementEstimate {
        match history {
            Some(samples) => Self::from_history(samples),
            None => self.from_spread(market, rng),
        }
    }

    /// Range over genuine price samples; empty history yields all zeros
    pub fn from_history(samples: &[PriceSample]) -> MovementEstimate {
        let mut sorted = samples.to_vec();
        sorted.sort_by_key(|s| s.timestamp);

        let Some(latest) = sorted.last() else {
            return MovementEstimate::default();
        };

        let high = sorted.iter().map(|s| s.price).max().unwrap_or(latest.price);
        let low = sorted.iter().map(|s| s.price).min().unwrap_or(latest.price);

        MovementEstimate::from_range(latest.price, high, low)
    }

    /// Pseudo-range derived from the spread of current token prices
    pub fn from_spread<R: Rng + ?Sized>(
        &self,
        market: &NormalizedMarket,
        rng: &mut R,
    ) -> MovementEstimate {
        let current_price = market
            .primary_token()
            .map(|t| t.price)
            .unwrap_or(dec!(0.5))
            .clamp(Decimal::ZERO, Decimal::ONE);

        let token_spread = if market.tokens.len() < 2 {
            DEFAULT_TOKEN_SPREAD
        } else {
            let prices = market.tokens.iter().map(|t| t.price);
            let max = prices.clone().max().unwrap_or(Decimal::ZERO);
            let min = prices.min().unwrap_or(Decimal::ZERO);
            max - min
        };

        let variation = (token_spread * SPREAD_FACTOR).clamp(MIN_VARIATION, MAX_VARIATION);
        let (up, down) = if self.synthetic_jitter {
            (jitter_fraction(rng), jitter_fraction(rng))
        } else {
            (dec!(0.5), dec!(0.5))
        };

        let high = (current_price + variation * up).min(Decimal::ONE);
        let low = (current_price - variation * down).max(Decimal::ZERO);

        MovementEstimate::from_range(current_price, high, low)
    }
}

fn jitter_fraction<R: Rng + ?Sized>(rng: &mut R) -> Decimal {
    Decimal::new(rng.gen_range(JITTER_MIN_BPS..=JITTER_MAX_BPS), 4)
}
