//! Market regime classifier.
//!
//! Maps metrics and the detector's own recent output to a regime using an
//! ordered rule list; the first rule that matches wins:
//! 1. Volatile: volatility percentile above the extreme threshold
//! 2. Squeeze: percentile below the low threshold with stability > 0.7
//! 3. Breakout: previous detection was a squeeze and percentile is above normal
//! 4. Trending up/down: strong trend with efficient price action
//! 5. Ranging: everything else
//!
//! The volatility tier is bucketed separately from the same percentile.

use crate::window::RollingWindow;

use super::config::{RegimeConfig, VolatilityThresholds};
use super::types::{MarketRegime, RegimeDetection, RegimeMetrics, VolatilityState};

/// Stability required before low volatility counts as a squeeze.
pub const SQUEEZE_MIN_STABILITY: f64 = 0.7;

/// Ticks used to decide trend direction.
pub const DIRECTION_LOOKBACK: usize = 5;

/// Direction of the most recent price move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Up,
    Down,
}

impl TrendDirection {
    /// Sign of the change over the newest [`DIRECTION_LOOKBACK`] ticks.
    /// Flat, short or non-finite moves count as up.
    pub fn from_prices(prices: &[f64]) -> Self {
        let Some(&last) = prices.last() else {
            return Self::Up;
        };
        let first = prices[prices.len().saturating_sub(DIRECTION_LOOKBACK)];
        if last - first < 0.0 {
            Self::Down
        } else {
            Self::Up
        }
    }
}

/// Rule-based regime classifier.
#[derive(Debug, Clone)]
pub struct RegimeClassifier {
    trend_threshold: f64,
    range_efficiency_threshold: f64,
    thresholds: VolatilityThresholds,
}

impl RegimeClassifier {
    pub fn new(config: &RegimeConfig) -> Self {
        Self {
            trend_threshold: config.trend_threshold,
            range_efficiency_threshold: config.range_efficiency_threshold,
            thresholds: config.volatility_thresholds,
        }
    }

    /// Classify from metrics and the detection history.
    ///
    /// Only the newest history entry is consulted, for the breakout rule.
    pub fn classify(
        &self,
        metrics: &RegimeMetrics,
        history: &RollingWindow<RegimeDetection>,
        direction: TrendDirection,
    ) -> MarketRegime {
        let percentile = metrics.volatility_percentile();
        let previous = history.last().map(|d| d.regime);

        if percentile > self.thresholds.extreme {
            return MarketRegime::Volatile;
        }

        if percentile < self.thresholds.low
            && metrics.regime_stability() > SQUEEZE_MIN_STABILITY
        {
            return MarketRegime::Squeeze;
        }

        if previous == Some(MarketRegime::Squeeze) && percentile > self.thresholds.normal {
            return MarketRegime::Breakout;
        }

        if metrics.trend_strength() > self.trend_threshold
            && metrics.range_efficiency() > self.range_efficiency_threshold
        {
            return match direction {
                TrendDirection::Up => MarketRegime::TrendingUp,
                TrendDirection::Down => MarketRegime::TrendingDown,
            };
        }

        MarketRegime::Ranging
    }

    pub fn volatility_state(&self, percentile: f64) -> VolatilityState {
        classify_volatility_state(percentile, &self.thresholds)
    }
}

/// Bucket a volatility percentile into a tier.
pub fn classify_volatility_state(
    percentile: f64,
    thresholds: &VolatilityThresholds,
) -> VolatilityState {
    if percentile >= thresholds.extreme {
        VolatilityState::Extreme
    } else if percentile >= thresholds.high {
        VolatilityState::High
    } else if percentile >= thresholds.normal {
        VolatilityState::Normal
    } else {
        VolatilityState::Low
    }
}
