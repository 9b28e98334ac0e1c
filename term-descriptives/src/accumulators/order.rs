//! Order (non-parametric) statistics computed by walking sorted values.

use serde::{Deserialize, Serialize};

use super::Distribution;
use crate::error::{DescriptivesError, Result};

/// Quartile points reported by the five-number summary.
const QUARTILE_POINTS: [f64; 3] = [0.25, 0.5, 0.75];

/// Result of a percentile lookup.
///
/// `value` is an observed value, never interpolated. `lower..upper` is the
/// cumulative-frequency interval that value occupies; any probability mass
/// inside it is not resolved any further.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentile {
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
}

impl Percentile {
    fn degenerate(value: f64, p: f64) -> Self {
        Self {
            value,
            lower: p,
            upper: p,
        }
    }
}

/// Order statistics over any [`Distribution`].
pub trait OrderStatistics: Distribution {
    /// Returns `(min, max, range)`.
    ///
    /// `range` is `None` when every observation is the same value; all three
    /// are `None` for an empty distribution.
    fn min_max_range(&self) -> (Option<f64>, Option<f64>, Option<f64>) {
        let mut sorted = self.frequencies().iter_sorted();
        let Some((min, _)) = sorted.next() else {
            return (None, None, None);
        };
        let max = sorted.last().map_or(min, |(value, _)| value);
        let range = (max != min).then(|| max - min);
        (Some(min), Some(max), range)
    }

    fn min(&self) -> Option<f64> {
        self.min_max_range().0
    }

    fn max(&self) -> Option<f64> {
        self.min_max_range().1
    }

    fn range(&self) -> Option<f64> {
        self.min_max_range().2
    }

    /// Yields `(value, count / n)` in ascending value order.
    ///
    /// Each call starts a fresh walk over the table.
    fn relative_frequencies(&self) -> Box<dyn Iterator<Item = (f64, f64)> + '_> {
        let table = self.frequencies();
        let n = table.total() as f64;
        Box::new(
            table
                .iter_sorted()
                .map(move |(value, count)| (value, count as f64 / n)),
        )
    }

    /// Returns `[min, Q1, median, Q3, max]`, or five `None` when empty.
    fn five_number_summary(&self) -> [Option<f64>; 5] {
        let table = self.frequencies();
        let n = table.total();
        if n == 0 {
            return [None; 5];
        }

        let mut quartiles = [None; 3];
        let mut points = QUARTILE_POINTS.iter().enumerate().peekable();
        let mut cumulative = 0u64;
        let (mut min, mut max) = (None, None);

        for (value, count) in table.iter_sorted() {
            min.get_or_insert(value);
            max = Some(value);
            cumulative += count;
            let upper = cumulative as f64 / n as f64;
            // One value can carry enough mass to answer several points.
            while let Some((slot, _)) = points.next_if(|(_, point)| **point < upper) {
                quartiles[slot] = Some(value);
            }
        }

        // Rounding in `upper` can leave the last point unanswered; it belongs to max.
        for quartile in quartiles.iter_mut() {
            if quartile.is_none() {
                *quartile = max;
            }
        }

        [min, quartiles[0], quartiles[1], quartiles[2], max]
    }

    /// Finds the observed value at cumulative probability `p`.
    ///
    /// Fails with `InvalidArgument` unless `0 <= p <= 1`. Returns `Ok(None)`
    /// for an empty distribution.
    fn percentile(&self, p: f64) -> Result<Option<Percentile>> {
        if !(0.0..=1.0).contains(&p) {
            return Err(DescriptivesError::invalid_argument(format!(
                "percentile {p} outside [0, 1]"
            )));
        }

        let table = self.frequencies();
        let n = table.total();
        if n == 0 {
            return Ok(None);
        }
        if p == 0.0 {
            return Ok(self.min().map(|min| Percentile::degenerate(min, 0.0)));
        }
        if p == 1.0 {
            return Ok(self.max().map(|max| Percentile::degenerate(max, 1.0)));
        }

        let mut cumulative = 0u64;
        let mut last = None;
        for (value, count) in table.iter_sorted() {
            let lower = cumulative as f64 / n as f64;
            cumulative += count;
            let upper = cumulative as f64 / n as f64;
            if p < upper {
                return Ok(Some(Percentile {
                    value,
                    lower,
                    upper,
                }));
            }
            last = Some((value, lower));
        }

        Ok(last.map(|(value, lower)| Percentile {
            value,
            lower,
            upper: 1.0,
        }))
    }

    fn median(&self) -> Option<f64> {
        self.percentile(0.5)
            .ok()
            .flatten()
            .map(|percentile| percentile.value)
    }

    /// Returns the most frequent `(value, count)`.
    ///
    /// Ties resolve to the smallest value among those sharing the highest count.
    fn mode_freq(&self) -> Option<(f64, u64)> {
        self.frequencies()
            .iter_sorted()
            .fold(None, |best, (value, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((value, count)),
            })
    }

    fn mode(&self) -> Option<f64> {
        self.mode_freq().map(|(value, _)| value)
    }
}

impl<T: Distribution + ?Sized> OrderStatistics for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulators::FrequencyTable;

    fn table(values: &[f64]) -> FrequencyTable {
        values.iter().copied().collect()
    }

    #[test]
    fn test_min_max_range() {
        let t = table(&[4.0, 1.0, 2.0, 2.0, 3.0]);
        assert_eq!(t.min_max_range(), (Some(1.0), Some(4.0), Some(3.0)));
    }

    #[test]
    fn test_range_undefined_for_single_value() {
        let t = table(&[7.0, 7.0]);
        assert_eq!(t.min_max_range(), (Some(7.0), Some(7.0), None));
        assert_eq!(FrequencyTable::new().min_max_range(), (None, None, None));
    }

    #[test]
    fn test_relative_frequencies_sum_to_one() {
        let t = table(&[1.0, 2.0, 2.0, 3.0, 4.0]);
        let freqs: Vec<_> = t.relative_frequencies().collect();
        assert_eq!(freqs.len(), 4);
        assert_eq!(freqs[1], (2.0, 0.4));
        let total: f64 = freqs.iter().map(|(_, f)| f).sum();
        assert!((total - 1.0).abs() < 1e-12);

        // Restartable: a second walk sees the same sequence.
        assert_eq!(t.relative_frequencies().collect::<Vec<_>>(), freqs);
    }

    #[test]
    fn test_five_number_summary() {
        let t = table(&[1.0, 2.0, 2.0, 3.0, 4.0]);
        assert_eq!(
            t.five_number_summary(),
            [Some(1.0), Some(2.0), Some(2.0), Some(3.0), Some(4.0)]
        );
    }

    #[test]
    fn test_five_number_summary_with_dominant_value() {
        let t = table(&[1.0, 1.0, 1.0, 1.0, 2.0]);
        assert_eq!(
            t.five_number_summary(),
            [Some(1.0), Some(1.0), Some(1.0), Some(1.0), Some(2.0)]
        );
    }

    #[test]
    fn test_five_number_summary_empty() {
        assert_eq!(FrequencyTable::new().five_number_summary(), [None; 5]);
    }

    #[test]
    fn test_percentile_endpoints() {
        let t = table(&[1.0, 2.0, 2.0, 3.0, 4.0]);
        assert_eq!(
            t.percentile(0.0).unwrap(),
            Some(Percentile {
                value: 1.0,
                lower: 0.0,
                upper: 0.0
            })
        );
        assert_eq!(
            t.percentile(1.0).unwrap(),
            Some(Percentile {
                value: 4.0,
                lower: 1.0,
                upper: 1.0
            })
        );
    }

    #[test]
    fn test_percentile_reports_bracket() {
        let t = table(&[1.0, 2.0, 2.0, 3.0, 4.0]);
        let p = t.percentile(0.5).unwrap().unwrap();
        assert_eq!(p.value, 2.0);
        assert!((p.lower - 0.2).abs() < 1e-12);
        assert!((p.upper - 0.6).abs() < 1e-12);

        // Bracket lower bound is inclusive.
        let p = t.percentile(0.2).unwrap().unwrap();
        assert_eq!(p.value, 2.0);
    }

    #[test]
    fn test_percentile_rejects_out_of_range() {
        let t = table(&[1.0]);
        assert!(matches!(
            t.percentile(1.5),
            Err(DescriptivesError::InvalidArgument(_))
        ));
        assert!(t.percentile(-0.1).is_err());
        assert!(t.percentile(f64::NAN).is_err());
    }

    #[test]
    fn test_percentile_empty_distribution() {
        assert_eq!(FrequencyTable::new().percentile(0.3).unwrap(), None);
    }

    #[test]
    fn test_median_and_mode() {
        let t = table(&[1.0, 2.0, 2.0, 3.0, 4.0]);
        assert_eq!(t.median(), Some(2.0));
        assert_eq!(t.mode_freq(), Some((2.0, 2)));
        assert_eq!(t.mode(), Some(2.0));
    }

    #[test]
    fn test_mode_tie_is_deterministic() {
        let t = table(&[5.0, 3.0, 5.0, 3.0, 9.0]);
        assert_eq!(t.mode_freq(), Some((3.0, 2)));
        assert_eq!(FrequencyTable::new().mode_freq(), None);
    }
}
