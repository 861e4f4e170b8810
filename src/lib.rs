//! poly-movers: Polymarket 24h movers scanner
//!
//! This library provides the core components for:
//! - Market listing retrieval via the Gamma API
//! - Field normalization of loosely-typed market records
//! - Tag and keyword based categorization
//! - 24h movement estimation from price history or token spreads
//! - Tiered fallback filtering and movement ranking
//! - Periodic refresh with snapshot replacement
//! - Structured logging and Prometheus metrics

pub mod cli;
pub mod config;
pub mod market;
pub mod movement;
pub mod pipeline;
pub mod source;
pub mod telemetry;
pub mod tracker;
