//! Market regime detection module.
//!
//! Classifies a single instrument's tick stream into:
//! - Trending up / down: strong, efficient directional movement
//! - Ranging: no clear direction
//! - Volatile: volatility in the extreme tail of its history
//! - Squeeze: compressed volatility with a stable label
//! - Breakout: volatility expanding straight out of a squeeze
//!
//! plus an independent low/normal/high/extreme volatility tier.

pub mod classifier;
pub mod confidence;
pub mod config;
pub mod detector;
pub mod statistics;
pub mod types;

pub use classifier::{classify_volatility_state, RegimeClassifier, TrendDirection};
pub use confidence::score_confidence;
pub use config::{
    ConfigError, DirectionalMethod, PercentileMethod, RegimeConfig, StrategyConfig,
    VolatilityThresholds,
};
pub use detector::RegimeDetector;
pub use statistics::{RegimeStatistics, STATISTICS_WINDOW};
pub use types::{MarketRegime, MetricsError, RegimeDetection, RegimeMetrics, VolatilityState};
