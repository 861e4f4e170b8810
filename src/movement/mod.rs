//! Movement estimation module
//!
//! 24h high/low/movement from real price history, or a bounded estimate
//! derived from the spread of current token prices.

mod estimator;

pub use estimator::{MovementEstimator, PriceSample};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Decimal places kept on every estimate field
pub const PRICE_DP: u32 = 4;

/// Price range of a market's primary outcome over the lookback window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementEstimate {
    pub current_price: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    /// Always `high - low`
    pub movement: Decimal,
}

impl MovementEstimate {
    /// Build from a range, rounding every field to `PRICE_DP` places
    pub(crate) fn from_range(current_price: Decimal, high: Decimal, low: Decimal) -> Self {
        let high = high.round_dp(PRICE_DP);
        let low = low.round_dp(PRICE_DP);
        let current_price = current_price.round_dp(PRICE_DP).clamp(low, high);
        Self {
            current_price,
            high,
            low,
            movement: high - low,
        }
    }

    /// Whether `low <= current_price <= high` and `movement == high - low`
    pub fn is_consistent(&self) -> bool {
        self.low <= self.current_price
            && self.current_price <= self.high
            && self.movement == self.high - self.low
            && self.movement >= Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_range_rounds() {
        let estimate = MovementEstimate::from_range(dec!(0.123456), dec!(0.2), dec!(0.05));
        assert_eq!(estimate.current_price, dec!(0.1235));
        assert_eq!(estimate.movement, dec!(0.15));
        assert!(estimate.is_consistent());
    }

    #[test]
    fn test_default_is_consistent() {
        assert!(MovementEstimate::default().is_consistent());
    }
}
