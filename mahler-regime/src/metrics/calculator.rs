//! Regime metrics calculator.
//!
//! Derives the six [`RegimeMetrics`] fields from a [`WindowStore`]:
//! - Trend strength: slope, directional strength and MA alignment
//! - Volatility percentile: realized volatility ranked against history
//! - Range efficiency: net move over total range
//! - Autocorrelation: lag-1 correlation of log returns
//! - Volume trend: volume slope agreeing with price slope
//! - Regime stability: consistency of recent detections

use std::collections::HashSet;

use crate::regime::{MarketRegime, MetricsError, RegimeConfig, RegimeMetrics};
use crate::window::WindowStore;

use super::stats::{self, finite_or, RANGE_EPSILON};
use super::strategy::{
    directional_strategy, percentile_strategy, DirectionalStrength, PercentileRank,
};

/// Lookback for directional strength.
pub const DIRECTIONAL_PERIOD: usize = 14;

/// Volatility samples needed before percentiles mean anything.
pub const MIN_PERCENTILE_SAMPLES: usize = 10;

/// Annualization factor for realized volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Normalized slopes below this are treated as no trend.
pub const SLOPE_NOISE_THRESHOLD: f64 = 0.01;

/// Computes regime metrics with strategies fixed at construction.
#[derive(Debug)]
pub struct RegimeMetricsCalculator {
    config: RegimeConfig,
    percentile: Box<dyn PercentileRank>,
    directional: Box<dyn DirectionalStrength>,
}

impl RegimeMetricsCalculator {
    /// Create a calculator using the strategies named in the config.
    pub fn new(config: RegimeConfig) -> Self {
        let percentile = percentile_strategy(config.strategies.percentile);
        let directional = directional_strategy(config.strategies.directional);
        Self::with_strategies(config, percentile, directional)
    }

    /// Create a calculator with caller-supplied strategies.
    pub fn with_strategies(
        config: RegimeConfig,
        percentile: Box<dyn PercentileRank>,
        directional: Box<dyn DirectionalStrength>,
    ) -> Self {
        Self {
            config,
            percentile,
            directional,
        }
    }

    pub fn percentile_strategy_name(&self) -> &'static str {
        self.percentile.name()
    }

    pub fn directional_strategy_name(&self) -> &'static str {
        self.directional.name()
    }

    /// Calculate metrics from the store.
    ///
    /// Records the current realized volatility into the store's volatility
    /// history before ranking it. Callers must ensure at least
    /// `lookback_medium` ticks are present.
    pub fn calculate(&self, store: &mut WindowStore) -> Result<RegimeMetrics, MetricsError> {
        let prices = stats::forward_fill(&store.prices());
        let volumes = stats::forward_fill(&store.volumes());

        let volatility = self.realized_volatility(&prices);
        store.record_volatility_sample(volatility);

        let history: Vec<MarketRegime> = store
            .recent_detections(self.config.regime_smoothing)
            .into_iter()
            .map(|d| d.regime)
            .collect();

        RegimeMetrics::new(
            self.trend_strength(&prices),
            self.volatility_percentile(&store.volatility_samples()),
            self.range_efficiency(&prices),
            self.autocorrelation(&prices),
            self.volume_trend(&prices, &volumes),
            regime_stability(&history, self.config.regime_smoothing),
        )
    }

    /// Mean of short slope, medium slope, directional strength and MA
    /// alignment, each clamped to [0, 1].
    pub fn trend_strength(&self, prices: &[f64]) -> f64 {
        let short = stats::tail(prices, self.config.lookback_short);
        let medium = stats::tail(prices, self.config.lookback_medium);

        let components = [
            stats::normalized_slope(short).abs(),
            stats::normalized_slope(medium).abs(),
            self.directional.strength(medium, DIRECTIONAL_PERIOD),
            self.ma_alignment(prices),
        ];

        let sum: f64 = components
            .iter()
            .map(|c| finite_or(*c, 0.0).clamp(0.0, 1.0))
            .sum();
        (sum / components.len() as f64).clamp(0.0, 1.0)
    }

    /// 1.0 when price, short MA and medium MA are strictly ordered, 0.5 when
    /// price and short MA sit on the same side of the medium MA, else 0.0.
    pub fn ma_alignment(&self, prices: &[f64]) -> f64 {
        let Some(&price) = prices.last() else {
            return 0.0;
        };
        let short_ma = stats::mean(stats::tail(prices, self.config.lookback_short));
        let medium_ma = stats::mean(stats::tail(prices, self.config.lookback_medium));

        if (price > short_ma && short_ma > medium_ma) || (price < short_ma && short_ma < medium_ma)
        {
            1.0
        } else if (price > medium_ma && short_ma > medium_ma)
            || (price < medium_ma && short_ma < medium_ma)
        {
            0.5
        } else {
            0.0
        }
    }

    /// Annualized standard deviation of log returns over the volatility
    /// window.
    pub fn realized_volatility(&self, prices: &[f64]) -> f64 {
        let window = stats::tail(prices, self.config.volatility_window + 1);
        let returns = stats::log_returns(window);
        finite_or(stats::std_dev(&returns) * TRADING_DAYS_PER_YEAR.sqrt(), 0.0)
    }

    /// Percentile of the newest volatility sample, 50 until enough samples.
    pub fn volatility_percentile(&self, samples: &[f64]) -> f64 {
        let finite: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.len() < MIN_PERCENTILE_SAMPLES {
            return 50.0;
        }
        finite_or(self.percentile.percentile_of_latest(&finite), 50.0).clamp(0.0, 100.0)
    }

    /// |last - first| / (max - min) over the short window.
    pub fn range_efficiency(&self, prices: &[f64]) -> f64 {
        let window = stats::tail(prices, self.config.lookback_short);
        let (Some(&first), Some(&last)) = (window.first(), window.last()) else {
            return 0.0;
        };
        let range = stats::range(window);
        let net = (last - first).abs();
        if !range.is_finite() || !net.is_finite() || range <= RANGE_EPSILON {
            return 0.0;
        }
        finite_or(net / range, 0.0).clamp(0.0, 1.0)
    }

    /// Lag-1 autocorrelation of log returns over the medium window.
    pub fn autocorrelation(&self, prices: &[f64]) -> f64 {
        let returns = stats::log_returns(stats::tail(prices, self.config.lookback_medium));
        if returns.len() < 3 {
            return 0.0;
        }
        stats::pearson(&returns[..returns.len() - 1], &returns[1..]).clamp(-1.0, 1.0)
    }

    /// +1 when volume and price trend the same way, -1 when opposed, 0 when
    /// either is flat.
    pub fn volume_trend(&self, prices: &[f64], volumes: &[f64]) -> f64 {
        let price_slope = stats::normalized_slope(stats::tail(prices, self.config.lookback_short));
        let volume_slope =
            stats::normalized_slope(stats::tail(volumes, self.config.lookback_short));

        if price_slope.abs() < SLOPE_NOISE_THRESHOLD || volume_slope.abs() < SLOPE_NOISE_THRESHOLD
        {
            return 0.0;
        }
        price_slope.signum() * volume_slope.signum()
    }
}

/// `1 - (unique - 1) / (window - 1)` over the newest `window` regimes.
///
/// Zero until `window` regimes exist. A window of one is trivially stable.
pub fn regime_stability(history: &[MarketRegime], window: usize) -> f64 {
    if window == 0 || history.len() < window {
        return 0.0;
    }
    if window == 1 {
        return 1.0;
    }

    let recent = &history[history.len() - window..];
    let unique: HashSet<_> = recent.iter().collect();
    let stability = 1.0 - (unique.len() - 1) as f64 / (window - 1) as f64;
    stability.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Tick;
    use crate::metrics::strategy::{DeltaBalance, ManualRank};
    use crate::regime::{DirectionalMethod, PercentileMethod, StrategyConfig};
    use approx::assert_relative_eq;

    fn calculator() -> RegimeMetricsCalculator {
        RegimeMetricsCalculator::new(RegimeConfig::default())
    }

    fn store_with(prices: &[f64], volume: f64) -> WindowStore {
        let mut store = WindowStore::new(RegimeConfig::default().tick_capacity());
        for (i, &p) in prices.iter().enumerate() {
            store.record_tick(Tick::new(p, volume, i as f64));
        }
        store
    }

    #[test]
    fn test_uptrend_metrics() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 0.5).collect();
        let mut store = store_with(&prices, 1000.0);
        let metrics = calculator().calculate(&mut store).unwrap();

        assert!(metrics.trend_strength() > 0.9);
        assert_relative_eq!(metrics.range_efficiency(), 1.0);
        assert_eq!(metrics.volume_trend(), 0.0);
        assert_eq!(metrics.volatility_percentile(), 50.0);
        assert_eq!(metrics.regime_stability(), 0.0);
        assert_eq!(store.volatility_count(), 1);
    }

    #[test]
    fn test_flat_prices_are_neutral() {
        let prices = vec![100.0; 60];
        let mut store = store_with(&prices, 1000.0);
        let calc = calculator();
        let metrics = calc.calculate(&mut store).unwrap();

        assert_eq!(calc.realized_volatility(&prices), 0.0);
        assert_eq!(metrics.trend_strength(), 0.0);
        assert_eq!(metrics.range_efficiency(), 0.0);
        assert_eq!(metrics.autocorrelation(), 0.0);
        assert_eq!(metrics.volume_trend(), 0.0);
        assert!(metrics.is_finite());
    }

    #[test]
    fn test_ma_alignment() {
        let calc = calculator();
        let up: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        assert_eq!(calc.ma_alignment(&up), 1.0);

        let down: Vec<f64> = up.iter().rev().copied().collect();
        assert_eq!(calc.ma_alignment(&down), 1.0);

        // Long rise, then a last-tick dip under the short MA.
        let mut dip = up.clone();
        dip.push(140.0);
        assert_eq!(calc.ma_alignment(&dip), 0.5);

        assert_eq!(calc.ma_alignment(&[100.0; 60]), 0.0);
        assert_eq!(calc.ma_alignment(&[]), 0.0);
    }

    #[test]
    fn test_range_efficiency_zigzag() {
        let calc = calculator();
        let zigzag: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 100.0 } else { 110.0 }).collect();
        // Net move of 10 over a range of 10, since the window ends high.
        assert_relative_eq!(calc.range_efficiency(&zigzag), 1.0);

        // Shifting the window by one makes it start and end at 110.
        let mut round_trip = zigzag.clone();
        round_trip.push(110.0);
        assert_eq!(calc.range_efficiency(&round_trip), 0.0);
    }

    #[test]
    fn test_autocorrelation_alternating_is_negative() {
        let calc = calculator();
        let prices: Vec<f64> = (0..60).map(|i| if i % 2 == 0 { 100.0 } else { 102.0 }).collect();
        assert!(calc.autocorrelation(&prices) < -0.9);
    }

    #[test]
    fn test_volume_trend_sign() {
        let calc = calculator();
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let rising: Vec<f64> = (0..30).map(|i| 1000.0 + 10.0 * i as f64).collect();
        let falling: Vec<f64> = rising.iter().rev().copied().collect();

        assert_eq!(calc.volume_trend(&prices, &rising), 1.0);
        assert_eq!(calc.volume_trend(&prices, &falling), -1.0);
        assert_eq!(calc.volume_trend(&prices, &[1000.0; 30]), 0.0);
    }

    #[test]
    fn test_volatility_percentile_needs_samples() {
        let calc = calculator();
        let few: Vec<f64> = (0..9).map(|i| i as f64).collect();
        assert_eq!(calc.volatility_percentile(&few), 50.0);

        let mut many: Vec<f64> = (0..30).map(|i| i as f64).collect();
        many.push(100.0);
        assert!(calc.volatility_percentile(&many) > 95.0);

        let mut with_nan = few.clone();
        with_nan.push(f64::NAN);
        assert_eq!(calc.volatility_percentile(&with_nan), 50.0);
    }

    #[test]
    fn test_realized_volatility_monotonic_in_deviation() {
        let calc = calculator();
        let a: Vec<f64> = (0..40).map(|i| if i % 2 == 0 { 99.0 } else { 101.0 }).collect();
        let b: Vec<f64> = (0..40).map(|i| if i % 2 == 0 { 95.0 } else { 105.0 }).collect();
        assert!(calc.realized_volatility(&b) >= calc.realized_volatility(&a));
        assert!(calc.realized_volatility(&a) > 0.0);
    }

    #[test]
    fn test_realized_volatility_non_positive_prices() {
        let calc = calculator();
        let prices = [100.0, 0.0, -3.0, 50.0, 100.0];
        assert!(calc.realized_volatility(&prices).is_finite());
    }

    #[test]
    fn test_regime_stability_extremes() {
        let same = [MarketRegime::Ranging; 5];
        assert_eq!(regime_stability(&same, 5), 1.0);

        let distinct = [
            MarketRegime::TrendingUp,
            MarketRegime::TrendingDown,
            MarketRegime::Ranging,
            MarketRegime::Volatile,
            MarketRegime::Squeeze,
        ];
        assert_eq!(regime_stability(&distinct, 5), 0.0);

        assert_eq!(regime_stability(&same[..4], 5), 0.0);
        assert_eq!(regime_stability(&same[..1], 1), 1.0);
    }

    #[test]
    fn test_regime_stability_uses_newest() {
        let history = [
            MarketRegime::Volatile,
            MarketRegime::Ranging,
            MarketRegime::Ranging,
            MarketRegime::Squeeze,
        ];
        // Newest three hold two labels: 1 - 1/2.
        assert_relative_eq!(regime_stability(&history, 3), 0.5);
    }

    #[test]
    fn test_strategies_from_config() {
        let config = RegimeConfig {
            strategies: StrategyConfig {
                percentile: PercentileMethod::Manual,
                directional: DirectionalMethod::WilderAdx,
            },
            ..Default::default()
        };
        let calc = RegimeMetricsCalculator::new(config);
        assert_eq!(calc.percentile_strategy_name(), "manual");
        assert_eq!(calc.directional_strategy_name(), "wilder_adx");

        let calc = RegimeMetricsCalculator::with_strategies(
            RegimeConfig::default(),
            Box::new(ManualRank),
            Box::new(DeltaBalance),
        );
        assert_eq!(calc.directional_strategy_name(), "delta_balance");
    }
}
