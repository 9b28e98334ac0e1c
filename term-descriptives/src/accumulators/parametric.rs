//! Parametric statistics: count, mean, variance and friends.

use serde::{Deserialize, Serialize};

use super::Distribution;

/// Single-pass sums over a frequency table.
///
/// Alongside the raw sums the walk keeps a running mean and the sum of
/// squared deviations from it, so the variance stays finite when the
/// squares themselves overflow `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParametricSums {
    /// Number of observations.
    pub n: u64,
    /// Sum of all observations.
    pub sum: f64,
    /// Sum of squared observations.
    pub sum_of_squares: f64,
    /// Mean updated incrementally per distinct value.
    pub running_mean: f64,
    /// Sum of squared deviations from the mean, `sumsq - sum^2/n`.
    pub squared_deviations: f64,
}

impl ParametricSums {
    /// Accumulates the sums from `(value, count)` pairs.
    ///
    /// Returns `None` when there are no observations.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (f64, u64)>) -> Option<Self> {
        let mut sums = Self {
            n: 0,
            sum: 0.0,
            sum_of_squares: 0.0,
            running_mean: 0.0,
            squared_deviations: 0.0,
        };
        for (value, count) in pairs {
            if count == 0 {
                continue;
            }
            sums.n += count;
            let weight = count as f64;
            let weighted = value * weight;
            sums.sum += weighted;
            sums.sum_of_squares += value * weighted;

            // Weighted Welford step: `count` copies of `value` at once.
            let delta = value - sums.running_mean;
            sums.running_mean += delta * weight / sums.n as f64;
            sums.squared_deviations += delta * (value - sums.running_mean) * weight;
        }

        (sums.n > 0).then_some(sums)
    }

    /// Arithmetic mean, taken from the running mean so it survives an
    /// overflowing `sum`.
    pub fn mean(&self) -> f64 {
        self.running_mean
    }

    /// Population (`/n`) or sample (`/(n-1)`) variance.
    ///
    /// Undefined below two observations, and when the observations are not
    /// all finite. Rounding can leave a tiny negative number; anything not
    /// strictly positive reports as `0`.
    pub fn variance(&self, sample: bool) -> Option<f64> {
        if self.n < 2 {
            return None;
        }
        let n = self.n as f64;
        let raw = if sample {
            self.squared_deviations / (n - 1.0)
        } else {
            self.squared_deviations / n
        };
        if !raw.is_finite() {
            return None;
        }
        Some(if raw > 0.0 { raw } else { 0.0 })
    }

    /// Square root of [`ParametricSums::variance`].
    pub fn stdev(&self, sample: bool) -> Option<f64> {
        self.variance(sample).map(f64::sqrt)
    }

    /// Standard error of the mean, `stdev / sqrt(n - 1)`.
    pub fn stderr(&self, sample: bool) -> Option<f64> {
        let stdev = self.stdev(sample)?;
        Some(stdev / ((self.n - 1) as f64).sqrt())
    }
}

/// Parametric statistics over any [`Distribution`].
///
/// Sums are recomputed from the table on every call, so the cost is
/// proportional to the number of distinct values.
pub trait ParametricStatistics: Distribution {
    /// Recomputes `n`, sum and sum of squares from the table.
    fn parametric_sums(&self) -> Option<ParametricSums> {
        ParametricSums::from_pairs(self.frequencies().iter_sorted())
    }

    /// Returns `(n, mean, variance)`; `n` is `0` and both are `None` when empty.
    fn compute(&self, sample: bool) -> (u64, Option<f64>, Option<f64>) {
        match self.parametric_sums() {
            Some(sums) => (sums.n, Some(sums.mean()), sums.variance(sample)),
            None => (0, None, None),
        }
    }

    fn count(&self) -> u64 {
        self.frequencies().total()
    }

    fn mean(&self) -> Option<f64> {
        self.parametric_sums().map(|sums| sums.mean())
    }

    fn variance(&self, sample: bool) -> Option<f64> {
        self.parametric_sums()?.variance(sample)
    }

    fn stdev(&self, sample: bool) -> Option<f64> {
        self.parametric_sums()?.stdev(sample)
    }

    fn stderr(&self, sample: bool) -> Option<f64> {
        self.parametric_sums()?.stderr(sample)
    }
}

impl<T: Distribution + ?Sized> ParametricStatistics for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulators::FrequencyTable;

    fn table(values: &[f64]) -> FrequencyTable {
        values.iter().copied().collect()
    }

    #[test]
    fn test_sums_for_known_values() {
        let sums = table(&[1.0, 2.0, 2.0, 3.0, 4.0]).parametric_sums().unwrap();
        assert_eq!(sums.n, 5);
        assert_eq!(sums.sum, 12.0);
        assert_eq!(sums.sum_of_squares, 34.0);
        assert!((sums.mean() - 2.4).abs() < 1e-12);
    }

    #[test]
    fn test_population_and_sample_variance() {
        let t = table(&[1.0, 2.0, 2.0, 3.0, 4.0]);
        assert!((t.variance(false).unwrap() - 1.04).abs() < 1e-12);
        assert!((t.variance(true).unwrap() - 1.3).abs() < 1e-12);
    }

    #[test]
    fn test_compute_empty() {
        assert_eq!(FrequencyTable::new().compute(true), (0, None, None));
    }

    #[test]
    fn test_single_observation_has_no_variance() {
        let t = table(&[7.0]);
        assert_eq!(t.compute(false), (1, Some(7.0), None));
        assert_eq!(t.stdev(false), None);
        assert_eq!(t.stderr(false), None);
    }

    #[test]
    fn test_constant_values_clamp_to_zero() {
        let t = table(&[0.1; 10]);
        assert_eq!(t.variance(false), Some(0.0));
        assert_eq!(t.variance(true), Some(0.0));
    }

    #[test]
    fn test_cancellation_never_goes_negative() {
        // Large offset with tiny spread.
        let t = table(&[1e9 + 0.1, 1e9 + 0.1, 1e9 + 0.1]);
        let variance = t.variance(false).unwrap();
        assert!(variance >= 0.0);
    }

    #[test]
    fn test_large_magnitudes_keep_their_spread() {
        let t = table(&[1e160, 1e160 + 1e150]);
        let sums = t.parametric_sums().unwrap();
        assert!(sums.sum_of_squares.is_infinite());

        let variance = t.variance(false).unwrap();
        assert!((variance / 2.5e299 - 1.0).abs() < 1e-6, "got {variance}");
        assert!((t.mean().unwrap() / 1e160 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_non_finite_observations_have_no_variance() {
        assert_eq!(table(&[1.0, f64::INFINITY]).variance(false), None);
        assert_eq!(table(&[1.0, f64::NAN]).variance(true), None);
        assert_eq!(table(&[f64::INFINITY, f64::INFINITY]).stdev(false), None);
    }

    #[test]
    fn test_stderr_divides_by_sqrt_n_minus_one() {
        let t = table(&[1.0, 2.0, 2.0, 3.0, 4.0]);
        let stdev = t.stdev(false).unwrap();
        assert!((t.stderr(false).unwrap() - stdev / 2.0).abs() < 1e-12);
    }
}
