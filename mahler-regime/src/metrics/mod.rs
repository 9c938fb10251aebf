//! Regime metrics module.
//!
//! Provides:
//! - Guarded numeric helpers (slopes, log returns, correlation)
//! - Percentile and directional-strength strategies
//! - The calculator that turns rolling windows into `RegimeMetrics`

pub mod calculator;
pub mod stats;
pub mod strategy;

pub use calculator::{regime_stability, RegimeMetricsCalculator};
pub use strategy::{
    DeltaBalance, DirectionalStrength, ManualRank, PercentileRank, StatrsRank, WilderAdx,
};
