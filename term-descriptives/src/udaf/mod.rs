//! DataFusion bindings for the accumulators.
//!
//! This is the only module that talks to DataFusion's aggregate protocol.
//! Each registered name maps to an [`AggregateUDFImpl`] that builds a fresh
//! core accumulator per group, forwards every non-null row to its update
//! operation, ships partial state between partitions as Arrow lists, and
//! finalizes in `evaluate`.
//!
//! | SQL                          | Result                                   |
//! |------------------------------|------------------------------------------|
//! | `descriptives(x)`            | JSON summary record (`Utf8`)             |
//! | `mode(x)`                    | most frequent value (`Float64`)          |
//! | `mode_freq(x)`               | `"value;count"` (`Utf8`)                 |
//! | `first(x)` / `first(x, k)`   | first `k` values (`Utf8`), alias `firstn`|
//! | `last(x)` / `last(x, k)`     | last `k` values (`Utf8`), alias `lastn`  |
//!
//! ```rust,no_run
//! use datafusion::prelude::*;
//! use term_descriptives::udaf::register_aggregates;
//!
//! # async fn example() -> datafusion::error::Result<()> {
//! let ctx = SessionContext::new();
//! register_aggregates(&ctx, 1);
//! let df = ctx.sql("SELECT descriptives(price), last(price, 3) FROM trades").await?;
//! df.show().await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`AggregateUDFImpl`]: datafusion::logical_expr::AggregateUDFImpl

mod bounded;
mod frequency;

pub use bounded::{BoundedListAccumulator, BoundedListUdaf};
pub use frequency::{FrequencyAccumulator, FrequencyOutput, FrequencyUdaf};

use arrow::array::{Array, ArrayRef, AsArray, Float64Array};
use arrow::datatypes::{DataType, Float64Type};
use datafusion::execution::context::SessionContext;
use datafusion::logical_expr::AggregateUDF;
use tracing::{debug, instrument};

use crate::accumulators::ListPolicy;
use crate::error::{DescriptivesError, Result};

pub const DESCRIPTIVES: &str = "descriptives";
pub const MODE: &str = "mode";
pub const MODE_FREQ: &str = "mode_freq";
pub const FIRST: &str = "first";
pub const LAST: &str = "last";

/// `descriptives(x)`.
pub fn descriptives_udaf() -> AggregateUDF {
    AggregateUDF::new_from_impl(FrequencyUdaf::new(FrequencyOutput::Summary))
}

/// `mode(x)`.
pub fn mode_udaf() -> AggregateUDF {
    AggregateUDF::new_from_impl(FrequencyUdaf::new(FrequencyOutput::Mode))
}

/// `mode_freq(x)`.
pub fn mode_freq_udaf() -> AggregateUDF {
    AggregateUDF::new_from_impl(FrequencyUdaf::new(FrequencyOutput::ModeFreq))
}

/// `first(x [, k])`, also callable as `firstn`.
pub fn first_udaf(default_capacity: usize) -> AggregateUDF {
    AggregateUDF::new_from_impl(BoundedListUdaf::new(ListPolicy::First, default_capacity))
}

/// `last(x [, k])`, also callable as `lastn`.
pub fn last_udaf(default_capacity: usize) -> AggregateUDF {
    AggregateUDF::new_from_impl(BoundedListUdaf::new(ListPolicy::Last, default_capacity))
}

/// All aggregates provided by this crate.
pub fn all_aggregates(default_capacity: usize) -> Vec<AggregateUDF> {
    vec![
        descriptives_udaf(),
        mode_udaf(),
        mode_freq_udaf(),
        first_udaf(default_capacity),
        last_udaf(default_capacity),
    ]
}

/// Registers every aggregate on `ctx`.
///
/// `default_capacity` is the list size `first(x)` and `last(x)` use when no
/// `k` is given.
#[instrument(skip(ctx))]
pub fn register_aggregates(ctx: &SessionContext, default_capacity: usize) {
    for udaf in all_aggregates(default_capacity) {
        debug!(aggregate = udaf.name(), "registering aggregate");
        ctx.register_udaf(udaf);
    }
}

/// True for types the statistical aggregates accept.
pub(crate) fn is_supported_numeric(data_type: &DataType) -> bool {
    data_type.is_numeric() || matches!(data_type, DataType::Null | DataType::Boolean)
}

/// Casts an input column to `Float64`, rejecting non-numeric input.
///
/// Infinite and NaN values are rejected too: a summary cannot report them.
pub(crate) fn numeric_column(aggregate: &str, array: &ArrayRef) -> Result<Float64Array> {
    let data_type = array.data_type();
    if !is_supported_numeric(data_type) {
        return Err(DescriptivesError::unsupported_value_type(
            aggregate, data_type,
        ));
    }
    let cast = arrow::compute::cast(array, &DataType::Float64)?;
    let column = cast
        .as_primitive_opt::<Float64Type>()
        .cloned()
        .ok_or_else(|| DescriptivesError::unsupported_value_type(aggregate, cast.data_type()))?;

    if let Some(value) = column.iter().flatten().find(|value| !value.is_finite()) {
        return Err(DescriptivesError::unsupported_value_type(
            aggregate,
            format!("non-finite {data_type} value {value}"),
        ));
    }
    Ok(column)
}

/// Reads the first non-null entry of an integer-like column.
pub(crate) fn first_integer(array: &ArrayRef) -> Result<Option<i64>> {
    let cast = arrow::compute::cast(array, &DataType::Int64)?;
    let ints = cast
        .as_primitive_opt::<arrow::datatypes::Int64Type>()
        .ok_or_else(|| DescriptivesError::invalid_argument("capacity must be an integer"))?;
    Ok(ints.iter().flatten().next())
}

#[cfg(test)]
mod tests;
