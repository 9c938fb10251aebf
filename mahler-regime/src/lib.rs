pub mod data;
pub mod metrics;
pub mod regime;
pub mod window;

// Re-export commonly used types
pub use data::{load_ticks, replay, replay_many, ReplayReport, Tick};
pub use metrics::RegimeMetricsCalculator;
pub use regime::{
    MarketRegime, RegimeClassifier, RegimeConfig, RegimeDetection, RegimeDetector,
    RegimeMetrics, RegimeStatistics, VolatilityState,
};
pub use window::{RollingWindow, WindowStore};
