//! Prelude for commonly used types and traits in term-descriptives.

pub use crate::accumulators::{
    BoundedList, DescriptiveSummary, Descriptives, Distribution, FrequencyTable, ListPolicy,
    OrderStatistics, ParametricStatistics, Percentile,
};
pub use crate::config::DescriptivesConfig;
pub use crate::error::{DescriptivesError, Result};
pub use crate::logging::LogConfig;
pub use crate::session::{ColumnDescription, DescriptivesSession};
pub use crate::udaf::register_aggregates;
