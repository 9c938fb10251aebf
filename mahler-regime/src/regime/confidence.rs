//! Confidence scoring.
//!
//! Additive heuristic on top of a 0.5 base. The result ranks detections
//! against each other; it is not a calibrated probability.

use super::types::{MarketRegime, RegimeMetrics};

const BASE: f64 = 0.5;
const TREND_WEIGHT: f64 = 0.3;
const STABILITY_WEIGHT: f64 = 0.2;
const EFFICIENCY_BONUS: f64 = 0.1;
const HIGH_VOLATILITY_PENALTY: f64 = 0.2;

/// Range efficiency above which the efficiency bonus applies.
pub const EFFICIENCY_BONUS_THRESHOLD: f64 = 0.5;

/// Volatility percentile above which the penalty applies.
pub const HIGH_VOLATILITY_PERCENTILE: f64 = 80.0;

/// Confidence in [0, 1] for `regime` given `metrics`.
pub fn score_confidence(metrics: &RegimeMetrics, regime: MarketRegime) -> f64 {
    let mut confidence = BASE;

    if regime.is_trending() {
        confidence += TREND_WEIGHT * metrics.trend_strength();
    }

    confidence += STABILITY_WEIGHT * metrics.regime_stability();

    if metrics.range_efficiency() > EFFICIENCY_BONUS_THRESHOLD {
        confidence += EFFICIENCY_BONUS;
    }

    if metrics.volatility_percentile() > HIGH_VOLATILITY_PERCENTILE {
        confidence -= HIGH_VOLATILITY_PENALTY;
    }

    confidence.clamp(0.0, 1.0)
}
