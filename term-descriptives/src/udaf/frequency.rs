//! Aggregates backed by a frequency table: `descriptives`, `mode`, `mode_freq`.

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Field, FieldRef, Float64Type, UInt64Type};
use datafusion::common::ScalarValue;
use datafusion::error::Result as DataFusionResult;
use datafusion::logical_expr::function::{AccumulatorArgs, StateFieldsArgs};
use datafusion::logical_expr::utils::format_state_name;
use datafusion::logical_expr::{Accumulator, AggregateUDFImpl, Signature, Volatility};
use std::any::Any;
use std::sync::Arc;
use tracing::trace;

use super::{is_supported_numeric, numeric_column, DESCRIPTIVES, MODE, MODE_FREQ};
use crate::accumulators::{Descriptives, OrderStatistics, LIST_DELIMITER};
use crate::error::DescriptivesError;

/// What a frequency-table aggregate returns at finalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrequencyOutput {
    /// JSON descriptive summary.
    Summary,
    /// Most frequent value.
    Mode,
    /// Most frequent value and its count, `"value;count"`.
    ModeFreq,
}

impl FrequencyOutput {
    pub fn name(&self) -> &'static str {
        match self {
            FrequencyOutput::Summary => DESCRIPTIVES,
            FrequencyOutput::Mode => MODE,
            FrequencyOutput::ModeFreq => MODE_FREQ,
        }
    }

    pub fn return_type(&self) -> DataType {
        match self {
            FrequencyOutput::Mode => DataType::Float64,
            FrequencyOutput::Summary | FrequencyOutput::ModeFreq => DataType::Utf8,
        }
    }
}

/// Aggregate function definition for one [`FrequencyOutput`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrequencyUdaf {
    output: FrequencyOutput,
    signature: Signature,
}

impl FrequencyUdaf {
    pub fn new(output: FrequencyOutput) -> Self {
        Self {
            output,
            signature: Signature::any(1, Volatility::Immutable),
        }
    }
}

impl AggregateUDFImpl for FrequencyUdaf {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn name(&self) -> &str {
        self.output.name()
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn return_type(&self, arg_types: &[DataType]) -> DataFusionResult<DataType> {
        if let Some(input) = arg_types.first() {
            if !is_supported_numeric(input) {
                return Err(
                    DescriptivesError::unsupported_value_type(self.output.name(), input).into(),
                );
            }
        }
        Ok(self.output.return_type())
    }

    fn accumulator(&self, _acc_args: AccumulatorArgs) -> DataFusionResult<Box<dyn Accumulator>> {
        trace!(aggregate = self.output.name(), "creating accumulator");
        Ok(Box::new(FrequencyAccumulator::new(self.output)))
    }

    fn state_fields(&self, args: StateFieldsArgs) -> DataFusionResult<Vec<FieldRef>> {
        Ok(vec![
            Arc::new(Field::new(
                format_state_name(args.name, "values"),
                DataType::List(Arc::new(Field::new("item", DataType::Float64, true))),
                true,
            )),
            Arc::new(Field::new(
                format_state_name(args.name, "counts"),
                DataType::List(Arc::new(Field::new("item", DataType::UInt64, true))),
                true,
            )),
        ])
    }
}

/// Per-group accumulator wrapping [`Descriptives`].
#[derive(Debug)]
pub struct FrequencyAccumulator {
    output: FrequencyOutput,
    inner: Descriptives,
}

impl FrequencyAccumulator {
    pub fn new(output: FrequencyOutput) -> Self {
        Self {
            output,
            inner: Descriptives::new(),
        }
    }

    pub fn descriptives(&self) -> &Descriptives {
        &self.inner
    }
}

impl Accumulator for FrequencyAccumulator {
    fn update_batch(&mut self, values: &[ArrayRef]) -> DataFusionResult<()> {
        let Some(input) = values.first() else {
            return Ok(());
        };
        let column = numeric_column(self.output.name(), input)?;
        for value in column.iter().flatten() {
            self.inner.update(value);
        }
        Ok(())
    }

    fn evaluate(&mut self) -> DataFusionResult<ScalarValue> {
        let result = match self.output {
            FrequencyOutput::Summary => ScalarValue::Utf8(Some(self.inner.to_json()?)),
            FrequencyOutput::Mode => ScalarValue::Float64(self.inner.mode()),
            FrequencyOutput::ModeFreq => ScalarValue::Utf8(
                self.inner
                    .mode_freq()
                    .map(|(value, count)| format!("{value}{LIST_DELIMITER}{count}")),
            ),
        };
        Ok(result)
    }

    fn size(&self) -> usize {
        std::mem::size_of_val(self)
            + self.inner.table().distinct()
                * (std::mem::size_of::<f64>() + std::mem::size_of::<u64>())
    }

    fn state(&mut self) -> DataFusionResult<Vec<ScalarValue>> {
        let (values, counts): (Vec<_>, Vec<_>) = self
            .inner
            .table()
            .iter_sorted()
            .map(|(value, count)| {
                (
                    ScalarValue::Float64(Some(value)),
                    ScalarValue::UInt64(Some(count)),
                )
            })
            .unzip();

        Ok(vec![
            ScalarValue::List(ScalarValue::new_list_nullable(&values, &DataType::Float64)),
            ScalarValue::List(ScalarValue::new_list_nullable(&counts, &DataType::UInt64)),
        ])
    }

    fn merge_batch(&mut self, states: &[ArrayRef]) -> DataFusionResult<()> {
        let [values, counts] = states else {
            return Err(DescriptivesError::invalid_argument(format!(
                "{} expects 2 state columns, got {}",
                self.output.name(),
                states.len()
            ))
            .into());
        };
        let values = values.as_list_opt::<i32>().ok_or_else(|| {
            DescriptivesError::invalid_argument("frequency state values must be a list")
        })?;
        let counts = counts.as_list_opt::<i32>().ok_or_else(|| {
            DescriptivesError::invalid_argument("frequency state counts must be a list")
        })?;

        for row in 0..values.len() {
            if values.is_null(row) || counts.is_null(row) {
                continue;
            }
            let row_values = values.value(row);
            let row_counts = counts.value(row);
            let row_values = row_values
                .as_primitive_opt::<Float64Type>()
                .ok_or_else(|| DescriptivesError::invalid_argument("state values must be Float64"))?;
            let row_counts = row_counts
                .as_primitive_opt::<UInt64Type>()
                .ok_or_else(|| DescriptivesError::invalid_argument("state counts must be UInt64"))?;

            let table = self.inner.table_mut();
            for (value, count) in row_values.iter().zip(row_counts.iter()) {
                if let (Some(value), Some(count)) = (value, count) {
                    table.record_n(value, count);
                }
            }
        }
        trace!(
            aggregate = self.output.name(),
            distinct = self.inner.table().distinct(),
            "merged partial states"
        );
        Ok(())
    }
}
