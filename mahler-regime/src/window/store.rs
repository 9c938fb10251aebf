//! Per-instrument rolling store.
//!
//! Accepts raw values without validation. Numeric safety is handled by the
//! metrics calculator when the values are read.

use crate::data::Tick;
use crate::regime::RegimeDetection;

use super::rolling::RollingWindow;

/// Volatility samples kept for percentile ranking.
pub const VOLATILITY_HISTORY_CAPACITY: usize = 500;

/// Past detections kept for stability and reporting.
pub const DETECTION_HISTORY_CAPACITY: usize = 100;

/// Rolling ticks, volatility samples and detections for one instrument.
#[derive(Debug, Clone)]
pub struct WindowStore {
    ticks: RollingWindow<Tick>,
    volatility: RollingWindow<f64>,
    detections: RollingWindow<RegimeDetection>,
}

impl WindowStore {
    /// Create a store holding up to `tick_capacity` ticks.
    pub fn new(tick_capacity: usize) -> Self {
        Self {
            ticks: RollingWindow::new(tick_capacity),
            volatility: RollingWindow::new(VOLATILITY_HISTORY_CAPACITY),
            detections: RollingWindow::new(DETECTION_HISTORY_CAPACITY),
        }
    }

    pub fn record_tick(&mut self, tick: Tick) {
        self.ticks.push(tick);
    }

    pub fn record_volatility_sample(&mut self, value: f64) {
        self.volatility.push(value);
    }

    pub fn record_detection(&mut self, detection: RegimeDetection) {
        self.detections.push(detection);
    }

    pub fn ticks(&self) -> &RollingWindow<Tick> {
        &self.ticks
    }

    pub fn tick_count(&self) -> usize {
        self.ticks.len()
    }

    pub fn tick_capacity(&self) -> usize {
        self.ticks.capacity()
    }

    pub fn last_tick(&self) -> Option<&Tick> {
        self.ticks.last()
    }

    /// Prices in chronological order.
    pub fn prices(&self) -> Vec<f64> {
        self.ticks.iter().map(|t| t.price).collect()
    }

    /// Volumes in chronological order.
    pub fn volumes(&self) -> Vec<f64> {
        self.ticks.iter().map(|t| t.volume).collect()
    }

    pub fn volatility_samples(&self) -> Vec<f64> {
        self.volatility.to_vec()
    }

    pub fn volatility_count(&self) -> usize {
        self.volatility.len()
    }

    pub fn detections(&self) -> &RollingWindow<RegimeDetection> {
        &self.detections
    }

    pub fn last_detection(&self) -> Option<&RegimeDetection> {
        self.detections.last()
    }

    /// The newest `n` detections, oldest first.
    pub fn recent_detections(&self, n: usize) -> Vec<&RegimeDetection> {
        self.detections.tail(n).collect()
    }

    pub fn clear(&mut self) {
        self.ticks.clear();
        self.volatility.clear();
        self.detections.clear();
    }
}
