//! Regime labels, metric bundle and detection records.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a metric falls outside its documented range.
///
/// The calculator clamps every field, so seeing this means the calculator
/// itself is broken.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    #[error("{field} = {value} outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Market regime classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketRegime {
    /// Directional move upward with efficient price action.
    TrendingUp,
    /// Directional move downward with efficient price action.
    TrendingDown,
    /// Sideways, mean-reverting action.
    Ranging,
    /// Volatility in the extreme tail of its own history.
    Volatile,
    /// Compressed volatility with a stable recent classification.
    Squeeze,
    /// Volatility expansion straight out of a squeeze.
    Breakout,
    /// Placeholder before classification. Never returned by the detector.
    Unknown,
}

impl MarketRegime {
    /// Every label the detector can emit.
    pub const CLASSIFIED: [MarketRegime; 6] = [
        Self::TrendingUp,
        Self::TrendingDown,
        Self::Ranging,
        Self::Volatile,
        Self::Squeeze,
        Self::Breakout,
    ];

    pub fn is_trending(&self) -> bool {
        matches!(self, Self::TrendingUp | Self::TrendingDown)
    }

    /// Whether trend-following entries make sense in this regime.
    pub fn favors_trend_following(&self) -> bool {
        matches!(self, Self::TrendingUp | Self::TrendingDown | Self::Breakout)
    }

    /// Suggested position size multiplier for downstream sizing.
    pub fn position_size_multiplier(&self) -> f64 {
        match self {
            Self::TrendingUp | Self::TrendingDown => 1.0,
            Self::Breakout => 0.75,
            Self::Ranging => 0.75,
            Self::Squeeze => 0.5,
            Self::Volatile => 0.25,
            Self::Unknown => 0.0,
        }
    }

    /// Description of the regime.
    pub fn description(&self) -> &'static str {
        match self {
            Self::TrendingUp => "Efficient upward trend",
            Self::TrendingDown => "Efficient downward trend",
            Self::Ranging => "Range-bound, no clear direction",
            Self::Volatile => "Extreme volatility",
            Self::Squeeze => "Volatility compression",
            Self::Breakout => "Expansion out of a squeeze",
            Self::Unknown => "Unknown regime",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrendingUp => "trending_up",
            Self::TrendingDown => "trending_down",
            Self::Ranging => "ranging",
            Self::Volatile => "volatile",
            Self::Squeeze => "squeeze",
            Self::Breakout => "breakout",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Volatility tier relative to the instrument's own recent history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityState {
    Low,
    Normal,
    High,
    Extreme,
}

impl VolatilityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Extreme => "extreme",
        }
    }
}

impl fmt::Display for VolatilityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The six inputs to classification, each held to a fixed range.
///
/// Only constructible through [`RegimeMetrics::new`], which checks every
/// bound, or [`RegimeMetrics::neutral`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegimeMetrics {
    /// Directional movement across timeframes, [0, 1].
    trend_strength: f64,
    /// Rank of current realized volatility, [0, 100].
    volatility_percentile: f64,
    /// Net displacement over total range, [0, 1].
    range_efficiency: f64,
    /// Lag-1 autocorrelation of log returns, [-1, 1].
    autocorrelation: f64,
    /// Volume trend agreement with price trend, [-1, 1].
    volume_trend: f64,
    /// Consistency of recent classifications, [0, 1].
    regime_stability: f64,
}

fn check(field: &'static str, value: f64, min: f64, max: f64) -> Result<f64, MetricsError> {
    // NaN fails both comparisons, so it is rejected here too.
    if value >= min && value <= max {
        Ok(value)
    } else {
        Err(MetricsError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

impl RegimeMetrics {
    /// Validating constructor.
    pub fn new(
        trend_strength: f64,
        volatility_percentile: f64,
        range_efficiency: f64,
        autocorrelation: f64,
        volume_trend: f64,
        regime_stability: f64,
    ) -> Result<Self, MetricsError> {
        Ok(Self {
            trend_strength: check("trend_strength", trend_strength, 0.0, 1.0)?,
            volatility_percentile: check(
                "volatility_percentile",
                volatility_percentile,
                0.0,
                100.0,
            )?,
            range_efficiency: check("range_efficiency", range_efficiency, 0.0, 1.0)?,
            autocorrelation: check("autocorrelation", autocorrelation, -1.0, 1.0)?,
            volume_trend: check("volume_trend", volume_trend, -1.0, 1.0)?,
            regime_stability: check("regime_stability", regime_stability, 0.0, 1.0)?,
        })
    }

    /// No trend, median volatility, no stability.
    pub fn neutral() -> Self {
        Self {
            trend_strength: 0.0,
            volatility_percentile: 50.0,
            range_efficiency: 0.0,
            autocorrelation: 0.0,
            volume_trend: 0.0,
            regime_stability: 0.0,
        }
    }

    pub fn trend_strength(&self) -> f64 {
        self.trend_strength
    }

    pub fn volatility_percentile(&self) -> f64 {
        self.volatility_percentile
    }

    pub fn range_efficiency(&self) -> f64 {
        self.range_efficiency
    }

    pub fn autocorrelation(&self) -> f64 {
        self.autocorrelation
    }

    pub fn volume_trend(&self) -> f64 {
        self.volume_trend
    }

    pub fn regime_stability(&self) -> f64 {
        self.regime_stability
    }

    /// Whether every field is finite.
    pub fn is_finite(&self) -> bool {
        [
            self.trend_strength,
            self.volatility_percentile,
            self.range_efficiency,
            self.autocorrelation,
            self.volume_trend,
            self.regime_stability,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Output of one classification call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeDetection {
    pub regime: MarketRegime,
    pub volatility_state: VolatilityState,
    /// Heuristic confidence, [0, 1].
    pub confidence: f64,
    pub metrics: RegimeMetrics,
    /// Timestamp of the newest tick at classification time.
    pub timestamp: f64,
    /// Number of ticks the metrics were computed from.
    pub lookback_periods: usize,
}
