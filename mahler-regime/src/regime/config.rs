//! Detector configuration.
//!
//! Every option has its own default, so a TOML file only needs to name the
//! values it overrides:
//!
//! ```toml
//! lookback_medium = 40
//! trend_threshold = 0.55
//!
//! [volatility_thresholds]
//! extreme = 95.0
//!
//! [strategies]
//! percentile = "manual"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Percentile cut points for the volatility tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatilityThresholds {
    pub low: f64,
    pub normal: f64,
    pub high: f64,
    pub extreme: f64,
}

impl Default for VolatilityThresholds {
    fn default() -> Self {
        Self {
            low: 25.0,
            normal: 50.0,
            high: 75.0,
            extreme: 90.0,
        }
    }
}

/// How volatility is ranked against its history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentileMethod {
    /// Average-tie ranking from `statrs`.
    #[default]
    Statrs,
    /// Hand-counted below/equal ranking.
    Manual,
}

/// How directional strength is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionalMethod {
    /// Wilder-smoothed ADX over tick-to-tick moves.
    WilderAdx,
    /// Balance of up moves against down moves.
    #[default]
    DeltaBalance,
}

/// Strategy selection, resolved once when the detector is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub percentile: PercentileMethod,
    pub directional: DirectionalMethod,
}

/// Regime detector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeConfig {
    /// Short lookback (ticks).
    pub lookback_short: usize,
    /// Medium lookback; also the minimum ticks before classifying.
    pub lookback_medium: usize,
    /// Long lookback; the tick window holds twice this many.
    pub lookback_long: usize,
    /// Returns used for realized volatility.
    pub volatility_window: usize,
    /// Detections considered for stability.
    pub regime_smoothing: usize,
    /// Minimum trend strength for a trending regime.
    pub trend_threshold: f64,
    /// Minimum range efficiency for a trending regime.
    pub range_efficiency_threshold: f64,
    pub volatility_thresholds: VolatilityThresholds,
    pub strategies: StrategyConfig,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            lookback_short: 20,
            lookback_medium: 50,
            lookback_long: 200,
            volatility_window: 20,
            regime_smoothing: 5,
            trend_threshold: 0.6,
            range_efficiency_threshold: 0.3,
            volatility_thresholds: VolatilityThresholds::default(),
            strategies: StrategyConfig::default(),
        }
    }
}

impl RegimeConfig {
    /// Parse a TOML document, filling gaps with defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Ticks retained by the rolling store.
    pub fn tick_capacity(&self) -> usize {
        self.lookback_long.saturating_mul(2)
    }

    /// Check lookback ordering and threshold ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookback_short == 0 || self.volatility_window == 0 {
            return Err(ConfigError::Invalid(
                "lookback_short and volatility_window must be positive".to_string(),
            ));
        }
        if !(self.lookback_short <= self.lookback_medium
            && self.lookback_medium <= self.lookback_long)
        {
            return Err(ConfigError::Invalid(format!(
                "lookbacks must satisfy short <= medium <= long (got {}, {}, {})",
                self.lookback_short, self.lookback_medium, self.lookback_long
            )));
        }
        if self.regime_smoothing == 0 {
            return Err(ConfigError::Invalid(
                "regime_smoothing must be at least 1".to_string(),
            ));
        }

        for (name, value) in [
            ("trend_threshold", self.trend_threshold),
            ("range_efficiency_threshold", self.range_efficiency_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within [0, 1] (got {})",
                    name, value
                )));
            }
        }

        let t = &self.volatility_thresholds;
        let ordered = 0.0 <= t.low && t.low < t.normal && t.normal < t.high && t.high < t.extreme
            && t.extreme <= 100.0;
        if !ordered {
            return Err(ConfigError::Invalid(format!(
                "volatility thresholds must increase within [0, 100] (got {}/{}/{}/{})",
                t.low, t.normal, t.high, t.extreme
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RegimeConfig::default();
        assert_eq!(config.lookback_short, 20);
        assert_eq!(config.lookback_medium, 50);
        assert_eq!(config.lookback_long, 200);
        assert_eq!(config.volatility_window, 20);
        assert_eq!(config.regime_smoothing, 5);
        assert_eq!(config.trend_threshold, 0.6);
        assert_eq!(config.range_efficiency_threshold, 0.3);
        assert_eq!(config.volatility_thresholds.extreme, 90.0);
        assert_eq!(config.tick_capacity(), 400);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = RegimeConfig::from_toml_str(
            r#"
            lookback_medium = 40
            trend_threshold = 0.55

            [volatility_thresholds]
            extreme = 95.0

            [strategies]
            percentile = "manual"
            directional = "wilder_adx"
            "#,
        )
        .unwrap();

        assert_eq!(config.lookback_medium, 40);
        assert_eq!(config.lookback_short, 20);
        assert_eq!(config.trend_threshold, 0.55);
        assert_eq!(config.volatility_thresholds.extreme, 95.0);
        assert_eq!(config.volatility_thresholds.high, 75.0);
        assert_eq!(config.strategies.percentile, PercentileMethod::Manual);
        assert_eq!(config.strategies.directional, DirectionalMethod::WilderAdx);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = RegimeConfig::default();
        let text = config.to_toml_string().unwrap();
        let parsed = RegimeConfig::from_toml_str(&text).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_rejects_bad_lookbacks() {
        let config = RegimeConfig {
            lookback_short: 60,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = RegimeConfig {
            lookback_short: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unordered_thresholds() {
        let config = RegimeConfig {
            volatility_thresholds: VolatilityThresholds {
                low: 50.0,
                normal: 40.0,
                high: 75.0,
                extreme: 90.0,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RegimeConfig {
            trend_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            RegimeConfig::from_toml_str("lookback_short = \"twenty\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
