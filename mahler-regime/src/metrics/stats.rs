//! Numerically guarded series helpers.
//!
//! Every function here returns a finite value for any input, including
//! empty slices, constant series and series containing NaN or infinities.

/// Floor applied to prices before taking logs.
pub const PRICE_FLOOR: f64 = 1e-10;

/// Ranges at or below this are treated as flat.
pub const RANGE_EPSILON: f64 = 1e-10;

/// Variances at or below this are treated as constant.
pub const VARIANCE_EPSILON: f64 = 1e-12;

/// Return `value` if finite, otherwise `default`.
pub fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        default
    }
}

/// Replace non-finite entries with the last finite value seen (or 0.0).
pub fn forward_fill(values: &[f64]) -> Vec<f64> {
    let mut last = values.iter().copied().find(|v| v.is_finite()).unwrap_or(0.0);
    values
        .iter()
        .map(|&v| {
            if v.is_finite() {
                last = v;
            }
            last
        })
        .collect()
}

/// The newest `n` values (all of them if fewer).
pub fn tail(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    finite_or(values.iter().sum::<f64>() / values.len() as f64, 0.0)
}

/// Sample standard deviation (n - 1 denominator).
pub fn std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    finite_or(var.max(0.0).sqrt(), 0.0)
}

/// Max minus min. NaN entries are skipped by `f64::max`/`f64::min`;
/// infinities or an empty slice give a non-finite result callers guard.
pub fn range(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    max - min
}

/// Least-squares slope of `values` against their index.
pub fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values);

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }

    if den <= 0.0 {
        return 0.0;
    }
    finite_or(num / den, 0.0)
}

/// Slope expressed in units of (range / length), so it does not depend on
/// the price scale. Flat series give 0.
pub fn normalized_slope(values: &[f64]) -> f64 {
    let r = range(values);
    if !r.is_finite() || r <= RANGE_EPSILON {
        return 0.0;
    }
    let scale = r / values.len() as f64;
    finite_or(linear_slope(values) / scale, 0.0)
}

/// Log returns with prices floored at [`PRICE_FLOOR`].
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    let floored = |p: f64| if p.is_finite() { p.max(PRICE_FLOOR) } else { PRICE_FLOOR };
    prices
        .windows(2)
        .map(|w| finite_or((floored(w[1]) / floored(w[0])).ln(), 0.0))
        .collect()
}

/// Pearson correlation, 0 when either side is (near) constant.
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }
    let (a, b) = (&a[..n], &b[..n]);
    let (ma, mb) = (mean(a), mean(b));

    let mut cov = 0.0;
    let mut va = 0.0;
    let mut vb = 0.0;
    for (x, y) in a.iter().zip(b) {
        let (dx, dy) = (x - ma, y - mb);
        cov += dx * dy;
        va += dx * dx;
        vb += dy * dy;
    }

    let (va, vb) = (va / n as f64, vb / n as f64);
    if !(va > VARIANCE_EPSILON && vb > VARIANCE_EPSILON) {
        return 0.0;
    }
    finite_or(cov / n as f64 / (va.sqrt() * vb.sqrt()), 0.0).clamp(-1.0, 1.0)
}
