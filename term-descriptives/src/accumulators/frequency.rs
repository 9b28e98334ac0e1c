//! Frequency table shared by every statistical accumulator.

use ordered_float::OrderedFloat;
use std::collections::BTreeMap;

/// Compressed multiset of observations as `(value, count)` pairs.
///
/// The sum of all counts always equals the number of observations recorded.
/// Keys are kept ordered, so sorted iteration needs no extra pass. Memory
/// grows with the number of distinct values, not the number of observations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: BTreeMap<OrderedFloat<f64>, u64>,
}

impl FrequencyTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one observation of `value`.
    pub fn record(&mut self, value: f64) {
        self.record_n(value, 1);
    }

    /// Records `count` observations of `value` at once.
    pub fn record_n(&mut self, value: f64, count: u64) {
        if count == 0 {
            return;
        }
        *self.counts.entry(OrderedFloat(value)).or_insert(0) += count;
    }

    /// Folds every observation of `other` into this table.
    pub fn merge(&mut self, other: &FrequencyTable) {
        for (value, count) in other.iter_sorted() {
            self.record_n(value, count);
        }
    }

    /// Returns `(value, count)` pairs in ascending value order.
    pub fn iter_sorted(&self) -> impl Iterator<Item = (f64, u64)> + '_ {
        self.counts.iter().map(|(value, count)| (value.0, *count))
    }

    /// Total number of observations, `0` when empty.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct observed values.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Returns the count recorded for `value`.
    pub fn count_of(&self, value: f64) -> u64 {
        self.counts.get(&OrderedFloat(value)).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl FromIterator<f64> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut table = FrequencyTable::new();
        for value in iter {
            table.record(value);
        }
        table
    }
}

impl Extend<f64> for FrequencyTable {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for value in iter {
            self.record(value);
        }
    }
}
