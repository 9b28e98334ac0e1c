//! Streaming accumulators for exact descriptive statistics.
//!
//! Every statistical accumulator stores its observations in one owned
//! [`FrequencyTable`]. The statistics themselves are capabilities layered
//! over that table:
//!
//! - [`ParametricStatistics`]: n, mean, variance, standard deviation, standard error
//! - [`OrderStatistics`]: min/max/range, five-number summary, percentiles, mode
//!
//! Both are implemented for any [`Distribution`], so a single table serves
//! both without copying. [`Descriptives`] composes them into one
//! [`DescriptiveSummary`] record.
//!
//! The bounded list accumulators ([`BoundedList`]) are independent of the
//! frequency table and keep at most `K` raw values.
//!
//! ## Example
//!
//! ```rust
//! use term_descriptives::accumulators::{Descriptives, OrderStatistics, ParametricStatistics};
//!
//! let mut acc = Descriptives::new();
//! for value in [1.0, 2.0, 2.0, 3.0, 4.0] {
//!     acc.update(value);
//! }
//!
//! assert_eq!(acc.parametric_sums().map(|s| s.n), Some(5));
//! assert_eq!(acc.median(), Some(2.0));
//! assert_eq!(acc.mode_freq(), Some((2.0, 2)));
//!
//! let summary = acc.describe();
//! assert_eq!(summary.max, Some(4.0));
//! ```

mod bounded;
mod frequency;
mod order;
mod parametric;
mod summary;

pub use bounded::{BoundedList, ListOutput, ListPolicy, DEFAULT_CAPACITY, LIST_DELIMITER};
pub use frequency::FrequencyTable;
pub use order::{OrderStatistics, Percentile};
pub use parametric::{ParametricStatistics, ParametricSums};
pub use summary::{DescriptiveSummary, Descriptives};

/// Anything backed by a frequency table.
///
/// Implementing this single accessor grants both [`ParametricStatistics`]
/// and [`OrderStatistics`].
pub trait Distribution {
    /// Returns the underlying frequency table.
    fn frequencies(&self) -> &FrequencyTable;
}

impl Distribution for FrequencyTable {
    fn frequencies(&self) -> &FrequencyTable {
        self
    }
}
