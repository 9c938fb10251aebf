//! Aggregate statistics over recent detections.

use std::collections::BTreeMap;

use serde::Serialize;

use super::types::{MarketRegime, RegimeDetection};

/// Detections considered by a statistics report.
pub const STATISTICS_WINDOW: usize = 50;

/// Summary of recent classifier output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeStatistics {
    /// Detections per regime.
    pub regime_counts: BTreeMap<MarketRegime, usize>,
    pub avg_confidence: f64,
    pub avg_volatility_percentile: f64,
    /// Detections the report was computed over.
    pub total_detections: usize,
    pub current_regime: Option<MarketRegime>,
    /// Ticks currently retained.
    pub price_history_length: usize,
    /// Volatility samples currently retained.
    pub volatility_history_length: usize,
}

impl RegimeStatistics {
    /// Aggregate the given detections, oldest first.
    pub fn from_detections<'a, I>(
        detections: I,
        price_history_length: usize,
        volatility_history_length: usize,
    ) -> Self
    where
        I: IntoIterator<Item = &'a RegimeDetection>,
    {
        let mut regime_counts = BTreeMap::new();
        let mut confidence_sum = 0.0;
        let mut percentile_sum = 0.0;
        let mut total = 0usize;
        let mut current_regime = None;

        for detection in detections {
            *regime_counts.entry(detection.regime).or_insert(0) += 1;
            confidence_sum += detection.confidence;
            percentile_sum += detection.metrics.volatility_percentile();
            total += 1;
            current_regime = Some(detection.regime);
        }

        let (avg_confidence, avg_volatility_percentile) = if total > 0 {
            (confidence_sum / total as f64, percentile_sum / total as f64)
        } else {
            (0.0, 0.0)
        };

        Self {
            regime_counts,
            avg_confidence,
            avg_volatility_percentile,
            total_detections: total,
            current_regime,
            price_history_length,
            volatility_history_length,
        }
    }

    /// Detections labelled `regime`.
    pub fn count(&self, regime: MarketRegime) -> usize {
        self.regime_counts.get(&regime).copied().unwrap_or(0)
    }

    /// Share of detections labelled `regime`, in percent.
    pub fn pct_of_total(&self, regime: MarketRegime) -> f64 {
        if self.total_detections == 0 {
            return 0.0;
        }
        self.count(regime) as f64 / self.total_detections as f64 * 100.0
    }

    /// Generate a summary report.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Regime Statistics\n\
             =================\n\
             \n\
             Detections: {}\n\
             Current Regime: {}\n\
             Avg Confidence: {:.2}\n\
             Avg Volatility Percentile: {:.1}\n\
             Ticks Retained: {}\n\
             Volatility Samples: {}\n",
            self.total_detections,
            self.current_regime
                .map(|r| r.to_string())
                .unwrap_or_else(|| "n/a".to_string()),
            self.avg_confidence,
            self.avg_volatility_percentile,
            self.price_history_length,
            self.volatility_history_length,
        );

        if !self.regime_counts.is_empty() {
            out.push('\n');
            for (regime, count) in &self.regime_counts {
                out.push_str(&format!(
                    "{:<14} {:>4} ({:.0}%)\n",
                    regime.as_str(),
                    count,
                    self.pct_of_total(*regime)
                ));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regime::{RegimeMetrics, VolatilityState};
    use approx::assert_relative_eq;

    fn detection(regime: MarketRegime, confidence: f64, percentile: f64) -> RegimeDetection {
        RegimeDetection {
            regime,
            volatility_state: VolatilityState::Normal,
            confidence,
            metrics: RegimeMetrics::new(0.0, percentile, 0.0, 0.0, 0.0, 0.0).unwrap(),
            timestamp: 0.0,
            lookback_periods: 50,
        }
    }

    #[test]
    fn test_empty_history() {
        let stats = RegimeStatistics::from_detections(std::iter::empty(), 12, 0);
        assert_eq!(stats.total_detections, 0);
        assert_eq!(stats.avg_confidence, 0.0);
        assert_eq!(stats.avg_volatility_percentile, 0.0);
        assert_eq!(stats.current_regime, None);
        assert_eq!(stats.price_history_length, 12);
        assert_eq!(stats.pct_of_total(MarketRegime::Ranging), 0.0);
    }

    #[test]
    fn test_aggregates() {
        let history = vec![
            detection(MarketRegime::Ranging, 0.4, 20.0),
            detection(MarketRegime::Ranging, 0.6, 40.0),
            detection(MarketRegime::TrendingUp, 0.8, 60.0),
        ];
        let stats = RegimeStatistics::from_detections(&history, 100, 30);

        assert_eq!(stats.count(MarketRegime::Ranging), 2);
        assert_eq!(stats.count(MarketRegime::TrendingUp), 1);
        assert_eq!(stats.count(MarketRegime::Volatile), 0);
        assert_relative_eq!(stats.avg_confidence, 0.6, epsilon = 1e-12);
        assert_relative_eq!(stats.avg_volatility_percentile, 40.0, epsilon = 1e-12);
        assert_eq!(stats.current_regime, Some(MarketRegime::TrendingUp));
        assert_eq!(stats.volatility_history_length, 30);
        assert_relative_eq!(stats.pct_of_total(MarketRegime::Ranging), 200.0 / 3.0);
    }

    #[test]
    fn test_summary_lists_regimes() {
        let history = vec![detection(MarketRegime::Squeeze, 0.7, 10.0)];
        let summary = RegimeStatistics::from_detections(&history, 60, 11).summary();
        assert!(summary.contains("Current Regime: squeeze"));
        assert!(summary.contains("squeeze"));
        assert!(summary.contains("Ticks Retained: 60"));
    }

    #[test]
    fn test_serializes_counts_by_label() {
        let history = vec![detection(MarketRegime::Breakout, 0.7, 60.0)];
        let stats = RegimeStatistics::from_detections(&history, 60, 11);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["regime_counts"]["breakout"], 1);
        assert_eq!(json["current_regime"], "breakout");
    }
}
