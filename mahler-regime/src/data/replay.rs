//! Offline replay of recorded ticks through a detector.
//!
//! Provides:
//! - Single-series replay with a configurable classify cadence
//! - Parallel replay of several files, one detector per file

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::regime::{ConfigError, RegimeConfig, RegimeDetection, RegimeDetector, RegimeStatistics};

use super::loader::{load_ticks, LoaderError};
use super::types::Tick;

#[derive(thiserror::Error, Debug)]
pub enum ReplayError {
    #[error("Loader error: {0}")]
    Loader(#[from] LoaderError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Output of one replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    /// Input label, usually the file path.
    pub source: String,
    pub ticks: usize,
    pub detections: Vec<RegimeDetection>,
    pub statistics: RegimeStatistics,
}

impl ReplayReport {
    pub fn final_detection(&self) -> Option<&RegimeDetection> {
        self.detections.last()
    }
}

/// Feed `ticks` through a fresh detector, classifying after every
/// `every`-th tick (1 = after each tick).
pub fn replay(
    source: impl Into<String>,
    ticks: &[Tick],
    config: &RegimeConfig,
    every: usize,
) -> Result<ReplayReport, ReplayError> {
    let mut detector = RegimeDetector::try_new(config.clone())?;
    let every = every.max(1);
    let mut detections = Vec::new();

    for (i, tick) in ticks.iter().enumerate() {
        detector.record_tick(tick.price, tick.volume, Some(tick.timestamp));
        if (i + 1) % every == 0 {
            if let Some(detection) = detector.classify() {
                detections.push(detection);
            }
        }
    }

    Ok(ReplayReport {
        source: source.into(),
        ticks: ticks.len(),
        detections,
        statistics: detector.statistics(),
    })
}

/// Load a CSV file and replay it.
pub fn replay_file(
    path: impl AsRef<Path>,
    config: &RegimeConfig,
    every: usize,
) -> Result<ReplayReport, ReplayError> {
    let path = path.as_ref();
    let ticks = load_ticks(path)?;
    info!("Loaded {} ticks from {}", ticks.len(), path.display());

    let report = replay(path.display().to_string(), &ticks, config, every)?;
    info!(
        "{}: {} detections, final regime {}",
        report.source,
        report.detections.len(),
        report
            .final_detection()
            .map(|d| d.regime.as_str())
            .unwrap_or("n/a")
    );
    Ok(report)
}

/// Replay several files in parallel. Results keep input order.
pub fn replay_many(
    paths: &[PathBuf],
    config: &RegimeConfig,
    every: usize,
) -> Vec<Result<ReplayReport, ReplayError>> {
    paths
        .par_iter()
        .map(|path| replay_file(path, config, every))
        .collect()
}
