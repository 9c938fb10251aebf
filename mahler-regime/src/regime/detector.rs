//! Streaming regime detector.
//!
//! Owns the rolling windows for one instrument. Ticks go in through
//! [`RegimeDetector::record_tick`]; each [`RegimeDetector::classify`] call
//! computes metrics, applies the classifier rules and appends the resulting
//! detection to the bounded history it reads on the next call.
//!
//! The detector is single-threaded: share it across threads only behind a
//! lock, one instance per instrument.

use tracing::{debug, error};

use crate::data::{ObservationError, Tick};
use crate::metrics::stats::forward_fill;
use crate::metrics::{DirectionalStrength, PercentileRank, RegimeMetricsCalculator};
use crate::window::WindowStore;

use super::classifier::{RegimeClassifier, TrendDirection};
use super::confidence::score_confidence;
use super::config::{ConfigError, RegimeConfig};
use super::statistics::{RegimeStatistics, STATISTICS_WINDOW};
use super::types::{MarketRegime, RegimeDetection, RegimeMetrics};

/// Market regime detector for a single instrument.
#[derive(Debug)]
pub struct RegimeDetector {
    config: RegimeConfig,
    store: WindowStore,
    calculator: RegimeMetricsCalculator,
    classifier: RegimeClassifier,
}

impl RegimeDetector {
    /// Create a detector with the strategies named in the config.
    pub fn new(config: RegimeConfig) -> Self {
        let calculator = RegimeMetricsCalculator::new(config.clone());
        Self::with_calculator(config, calculator)
    }

    /// Create a detector after validating the config.
    pub fn try_new(config: RegimeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Create a detector with caller-supplied metric strategies.
    pub fn with_strategies(
        config: RegimeConfig,
        percentile: Box<dyn PercentileRank>,
        directional: Box<dyn DirectionalStrength>,
    ) -> Self {
        let calculator =
            RegimeMetricsCalculator::with_strategies(config.clone(), percentile, directional);
        Self::with_calculator(config, calculator)
    }

    fn with_calculator(config: RegimeConfig, calculator: RegimeMetricsCalculator) -> Self {
        debug!(
            percentile = calculator.percentile_strategy_name(),
            directional = calculator.directional_strategy_name(),
            "regime detector created"
        );
        Self {
            store: WindowStore::new(config.tick_capacity()),
            classifier: RegimeClassifier::new(&config),
            calculator,
            config,
        }
    }

    pub fn config(&self) -> &RegimeConfig {
        &self.config
    }

    /// Record an observation. Timestamp defaults to wall-clock time.
    ///
    /// Non-finite or negative values are stored as given and sanitized when
    /// metrics are computed, so they never surface as NaN in a detection.
    pub fn record_tick(&mut self, price: f64, volume: f64, timestamp: Option<f64>) {
        let tick = Tick::at(price, volume, timestamp);
        if let Err(err) = tick.validate() {
            debug!(%err, "recording degenerate tick");
        }
        self.store.record_tick(tick);
    }

    /// Record an observation, rejecting non-finite or negative values.
    pub fn try_record_tick(
        &mut self,
        price: f64,
        volume: f64,
        timestamp: Option<f64>,
    ) -> Result<(), ObservationError> {
        let tick = Tick::at(price, volume, timestamp);
        tick.validate()?;
        self.store.record_tick(tick);
        Ok(())
    }

    /// Classify the current market state.
    ///
    /// Returns `None` until `lookback_medium` ticks have been recorded.
    pub fn classify(&mut self) -> Option<RegimeDetection> {
        let tick_count = self.store.tick_count();
        if tick_count < self.config.lookback_medium {
            return None;
        }

        let metrics = match self.calculator.calculate(&mut self.store) {
            Ok(metrics) => metrics,
            Err(err) => {
                if cfg!(debug_assertions) {
                    panic!("metrics calculator produced an out-of-range value: {err}");
                }
                error!(%err, "metrics out of range, using neutral metrics");
                RegimeMetrics::neutral()
            }
        };

        let direction = TrendDirection::from_prices(&forward_fill(&self.store.prices()));
        let regime = self
            .classifier
            .classify(&metrics, self.store.detections(), direction);
        let volatility_state = self
            .classifier
            .volatility_state(metrics.volatility_percentile());
        let confidence = score_confidence(&metrics, regime);

        let previous = self.store.last_detection().map(|d| d.regime);
        if previous != Some(regime) {
            debug!(
                from = previous.map(|r| r.as_str()).unwrap_or("none"),
                to = regime.as_str(),
                confidence,
                volatility = volatility_state.as_str(),
                "regime change"
            );
        }

        let detection = RegimeDetection {
            regime,
            volatility_state,
            confidence,
            metrics,
            timestamp: self.store.last_tick().map(|t| t.timestamp).unwrap_or(0.0),
            lookback_periods: tick_count,
        };
        self.store.record_detection(detection.clone());

        Some(detection)
    }

    /// Regime of the most recent detection.
    pub fn current_regime(&self) -> Option<MarketRegime> {
        self.store.last_detection().map(|d| d.regime)
    }

    pub fn last_detection(&self) -> Option<&RegimeDetection> {
        self.store.last_detection()
    }

    /// Retained detections, oldest first.
    pub fn history(&self) -> Vec<RegimeDetection> {
        self.store.detections().to_vec()
    }

    pub fn tick_count(&self) -> usize {
        self.store.tick_count()
    }

    /// Aggregate statistics over the newest detections.
    pub fn statistics(&self) -> RegimeStatistics {
        RegimeStatistics::from_detections(
            self.store.detections().tail(STATISTICS_WINDOW),
            self.store.tick_count(),
            self.store.volatility_count(),
        )
    }

    /// Drop all ticks, samples and detections.
    pub fn reset(&mut self) {
        self.store.clear();
    }
}
