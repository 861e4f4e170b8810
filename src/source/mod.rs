//! Upstream market data sources
//!
//! Transport collaborators that hand the pipeline raw records or a typed
//! `FetchError`.

mod error;
mod gamma;

pub use error::FetchError;
pub use gamma::{
    extract_records, flatten_events, GammaClient, GammaConfig, CLOB_API_URL, GAMMA_API_URL,
};

use crate::market::RawMarket;
use crate::movement::PriceSample;
use async_trait::async_trait;

/// Trait for raw market record sources
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Fetch the current raw record set
    async fn fetch(&self) -> Result<Vec<RawMarket>, FetchError>;

    /// Price history for one outcome token; sources without history return
    /// an empty series
    async fn price_history(&self, _token_id: &str) -> Result<Vec<PriceSample>, FetchError> {
        Ok(Vec::new())
    }
}
