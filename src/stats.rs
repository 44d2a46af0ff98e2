//! Statistics primitives shared by calibration, scoring and detection
//!
//! All functions are pure and tolerate empty input: they return a neutral
//! value instead of panicking, so degraded data never aborts a run.

use serde::{Deserialize, Serialize};

/// Default Z for the Wilson interval (95% confidence)
pub const DEFAULT_WILSON_Z: f64 = 1.96;

/// Linear-interpolation percentile (R-7, the NumPy default).
///
/// `values` does not need to be sorted. `p` is clamped to `[0, 100]`.
/// Returns 0.0 for empty input.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    percentile_sorted(&sorted, p)
}

/// Same as [`percentile`] but trusts the caller that `sorted` is ascending.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    let p = p.clamp(0.0, 100.0);
    let k = (n - 1) as f64 * p / 100.0;
    let f = k.floor() as usize;
    if f >= n - 1 {
        return sorted[n - 1];
    }
    let c = k - f as f64;
    sorted[f] + c * (sorted[f + 1] - sorted[f])
}

/// Lower bound of the Wilson score interval for a binomial proportion.
///
/// Returns 0.5 when `games == 0`.
pub fn wilson_score_lower_bound(wins: u64, games: u64, z: f64) -> f64 {
    if games == 0 {
        return 0.5;
    }
    let n = games as f64;
    let p = wins as f64 / n;
    let z2 = z * z;

    let denominator = 1.0 + z2 / n;
    let centre = p + z2 / (2.0 * n);
    let adjustment = z * ((p * (1.0 - p) + z2 / (4.0 * n)) / n).sqrt();

    (centre - adjustment) / denominator
}

/// Z-score of `value` against `population` using the sample (n-1) stdev.
///
/// Returns 0.0 when the population has fewer than 2 values or zero spread.
pub fn z_score(value: f64, population: &[f64]) -> f64 {
    if population.len() < 2 {
        return 0.0;
    }
    let m = mean(population);
    let sd = stdev(population);
    if sd == 0.0 {
        return 0.0;
    }
    (value - m) / sd
}

/// Arithmetic mean, 0.0 for empty input
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (n-1), 0.0 with fewer than 2 values
pub fn variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64
}

/// Sample standard deviation (n-1), 0.0 with fewer than 2 values
pub fn stdev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Median, 0.0 for empty input
pub fn median(values: &[f64]) -> f64 {
    percentile(values, 50.0)
}

/// Mean/stdev/median summary of one population
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    /// Number of data points
    pub count: usize,
    pub mean: f64,
    pub stdev: f64,
    pub median: f64,
}

impl Distribution {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        Self {
            count: values.len(),
            mean: mean(values),
            stdev: stdev(values),
            median: median(values),
        }
    }
}
