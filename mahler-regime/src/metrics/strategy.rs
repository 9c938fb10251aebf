//! Interchangeable implementations for metrics that have both a library
//! backed and a hand-rolled form.
//!
//! The detector picks one of each when it is built; nothing switches per
//! call.

use std::fmt;

use statrs::statistics::{Data, OrderStatistics, RankTieBreaker};

use crate::regime::{DirectionalMethod, PercentileMethod};

use super::stats::finite_or;

/// Ranks the newest sample against the full sample set.
pub trait PercentileRank: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Percentile (0-100) of the last element of `samples` among all of
    /// them, counting ties as half below. Samples must be finite.
    fn percentile_of_latest(&self, samples: &[f64]) -> f64;
}

/// Average-tie ranking from `statrs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatrsRank;

impl PercentileRank for StatrsRank {
    fn name(&self) -> &'static str {
        "statrs"
    }

    fn percentile_of_latest(&self, samples: &[f64]) -> f64 {
        let n = samples.len();
        if n == 0 {
            return 50.0;
        }
        let mut data = Data::new(samples.to_vec());
        let ranks = data.ranks(RankTieBreaker::Average);
        // Average rank of a tie group is below + (equal + 1) / 2, so
        // subtracting a half leaves below + equal / 2.
        let rank = ranks.last().copied().unwrap_or(0.5);
        finite_or((rank - 0.5) / n as f64 * 100.0, 50.0).clamp(0.0, 100.0)
    }
}

/// Counts samples below and equal to the newest one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualRank;

impl PercentileRank for ManualRank {
    fn name(&self) -> &'static str {
        "manual"
    }

    fn percentile_of_latest(&self, samples: &[f64]) -> f64 {
        let Some(&latest) = samples.last() else {
            return 50.0;
        };
        let below = samples.iter().filter(|&&v| v < latest).count();
        let equal = samples.iter().filter(|&&v| v == latest).count();
        let pct = (below as f64 + 0.5 * equal as f64) / samples.len() as f64 * 100.0;
        finite_or(pct, 50.0).clamp(0.0, 100.0)
    }
}

/// Measures how one-sided recent price movement has been.
pub trait DirectionalStrength: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Strength in [0, 1] over the newest `period` moves of `prices`.
    /// Prices must be finite.
    fn strength(&self, prices: &[f64], period: usize) -> f64;
}

/// Sum of up moves against sum of down moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeltaBalance;

impl DirectionalStrength for DeltaBalance {
    fn name(&self) -> &'static str {
        "delta_balance"
    }

    fn strength(&self, prices: &[f64], period: usize) -> f64 {
        if prices.len() < 2 || period == 0 {
            return 0.0;
        }
        let start = prices.len().saturating_sub(period + 1);
        let (mut up, mut down) = (0.0, 0.0);
        for w in prices[start..].windows(2) {
            let delta = w[1] - w[0];
            if delta > 0.0 {
                up += delta;
            } else {
                down -= delta;
            }
        }

        let total = up + down;
        if !(total > 0.0) || !total.is_finite() {
            return 0.0;
        }
        finite_or((up - down).abs() / total, 0.0).clamp(0.0, 1.0)
    }
}

/// Wilder ADX over tick-to-tick moves.
///
/// Ticks carry no high/low, so each move is its own true range: an up move
/// counts fully as +DM, a down move fully as -DM. Series too short to seed
/// both smoothing passes fall back to [`DeltaBalance`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WilderAdx;

impl DirectionalStrength for WilderAdx {
    fn name(&self) -> &'static str {
        "wilder_adx"
    }

    fn strength(&self, prices: &[f64], period: usize) -> f64 {
        if period == 0 || prices.len() < 2 * period + 1 {
            return DeltaBalance.strength(prices, period);
        }

        let moves: Vec<(f64, f64, f64)> = prices
            .windows(2)
            .map(|w| {
                let d = w[1] - w[0];
                (d.max(0.0), (-d).max(0.0), d.abs())
            })
            .collect();

        let p = period as f64;
        let (mut plus_dm, mut minus_dm, mut tr) = moves[..period]
            .iter()
            .fold((0.0, 0.0, 0.0), |acc, m| (acc.0 + m.0, acc.1 + m.1, acc.2 + m.2));

        let dx = |plus_dm: f64, minus_dm: f64, tr: f64| -> f64 {
            if !(tr > 0.0) {
                return 0.0;
            }
            let plus_di = 100.0 * plus_dm / tr;
            let minus_di = 100.0 * minus_dm / tr;
            let sum = plus_di + minus_di;
            if sum > 0.0 {
                100.0 * (plus_di - minus_di).abs() / sum
            } else {
                0.0
            }
        };

        let mut dx_values = vec![dx(plus_dm, minus_dm, tr)];
        for m in &moves[period..] {
            plus_dm = plus_dm - plus_dm / p + m.0;
            minus_dm = minus_dm - minus_dm / p + m.1;
            tr = tr - tr / p + m.2;
            dx_values.push(dx(plus_dm, minus_dm, tr));
        }

        let mut adx = dx_values[..period].iter().sum::<f64>() / p;
        for value in &dx_values[period..] {
            adx = (adx * (p - 1.0) + value) / p;
        }

        finite_or(adx / 100.0, 0.0).clamp(0.0, 1.0)
    }
}

/// Build the percentile strategy named by the config.
pub fn percentile_strategy(method: PercentileMethod) -> Box<dyn PercentileRank> {
    match method {
        PercentileMethod::Statrs => Box::new(StatrsRank),
        PercentileMethod::Manual => Box::new(ManualRank),
    }
}

/// Build the directional strategy named by the config.
pub fn directional_strategy(method: DirectionalMethod) -> Box<dyn DirectionalStrength> {
    match method {
        DirectionalMethod::WilderAdx => Box::new(WilderAdx),
        DirectionalMethod::DeltaBalance => Box::new(DeltaBalance),
    }
}
