//! `first(x [, k])` and `last(x [, k])`.

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Field, FieldRef, UInt64Type};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use datafusion::common::ScalarValue;
use datafusion::error::Result as DataFusionResult;
use datafusion::logical_expr::function::{AccumulatorArgs, StateFieldsArgs};
use datafusion::logical_expr::utils::format_state_name;
use datafusion::logical_expr::{
    Accumulator, AggregateUDFImpl, Signature, TypeSignature, Volatility,
};
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use super::{first_integer, FIRST, LAST};
use crate::accumulators::{BoundedList, ListPolicy};
use crate::error::DescriptivesError;

/// Aggregate function definition for one [`ListPolicy`].
///
/// Values of any type are captured in their display form, so the result is
/// always text: the bare value for a single capture, the `;`-joined list
/// otherwise, NULL when the group had no non-null rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundedListUdaf {
    policy: ListPolicy,
    default_capacity: usize,
    signature: Signature,
    aliases: Vec<String>,
}

impl BoundedListUdaf {
    pub fn new(policy: ListPolicy, default_capacity: usize) -> Self {
        let alias = match policy {
            ListPolicy::First => "firstn",
            ListPolicy::Last => "lastn",
        };
        Self {
            policy,
            default_capacity,
            signature: Signature::one_of(
                vec![TypeSignature::Any(1), TypeSignature::Any(2)],
                Volatility::Immutable,
            ),
            aliases: vec![alias.to_string()],
        }
    }

    pub fn policy(&self) -> ListPolicy {
        self.policy
    }
}

impl AggregateUDFImpl for BoundedListUdaf {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn name(&self) -> &str {
        match self.policy {
            ListPolicy::First => FIRST,
            ListPolicy::Last => LAST,
        }
    }

    fn aliases(&self) -> &[String] {
        &self.aliases
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn return_type(&self, arg_types: &[DataType]) -> DataFusionResult<DataType> {
        if let Some(capacity) = arg_types.get(1) {
            if !(capacity.is_integer() || capacity == &DataType::Null) {
                return Err(DescriptivesError::invalid_argument(format!(
                    "{} capacity must be an integer, got {capacity}",
                    self.name()
                ))
                .into());
            }
        }
        Ok(DataType::Utf8)
    }

    fn accumulator(&self, _acc_args: AccumulatorArgs) -> DataFusionResult<Box<dyn Accumulator>> {
        trace!(aggregate = self.name(), "creating accumulator");
        Ok(Box::new(BoundedListAccumulator::new(
            self.policy,
            self.default_capacity,
        )))
    }

    fn state_fields(&self, args: StateFieldsArgs) -> DataFusionResult<Vec<FieldRef>> {
        Ok(vec![
            Arc::new(Field::new(
                format_state_name(args.name, "values"),
                DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))),
                true,
            )),
            Arc::new(Field::new(
                format_state_name(args.name, "capacity"),
                DataType::UInt64,
                true,
            )),
        ])
    }
}

/// Per-group accumulator wrapping a [`BoundedList`] of rendered values.
#[derive(Debug)]
pub struct BoundedListAccumulator {
    inner: BoundedList<String>,
}

impl BoundedListAccumulator {
    pub fn new(policy: ListPolicy, default_capacity: usize) -> Self {
        Self {
            inner: BoundedList::new(policy).with_default_capacity(default_capacity),
        }
    }

    pub fn list(&self) -> &BoundedList<String> {
        &self.inner
    }

    fn establish_capacity(&mut self, requested: Option<i64>) -> DataFusionResult<usize> {
        match self.inner.capacity() {
            Some(established) => {
                if let Some(requested) = requested.filter(|k| *k != established as i64) {
                    warn!(
                        aggregate = %self.inner.policy(),
                        established,
                        requested,
                        "ignoring capacity that differs from the first row"
                    );
                }
                Ok(established)
            }
            None => {
                let established = self.inner.initialize(requested)?;
                debug!(
                    aggregate = %self.inner.policy(),
                    capacity = established,
                    "list capacity established"
                );
                Ok(established)
            }
        }
    }
}

impl Accumulator for BoundedListAccumulator {
    fn update_batch(&mut self, values: &[ArrayRef]) -> DataFusionResult<()> {
        let Some(input) = values.first() else {
            return Ok(());
        };
        let requested = match values.get(1) {
            Some(capacity) => first_integer(capacity)?,
            None => None,
        };
        // An explicit capacity is validated even when every value is null.
        if input.len() == input.null_count() && requested.is_none() {
            return Ok(());
        }
        let capacity = self.establish_capacity(requested)?;
        if input.len() == input.null_count() {
            return Ok(());
        }

        let options = FormatOptions::default();
        let formatter = ArrayFormatter::try_new(input.as_ref(), &options)?;
        for row in 0..input.len() {
            if self.inner.is_full() {
                break;
            }
            if input.is_null(row) {
                continue;
            }
            self.inner
                .update(formatter.value(row).to_string(), Some(capacity as i64))?;
        }
        Ok(())
    }

    fn evaluate(&mut self) -> DataFusionResult<ScalarValue> {
        Ok(ScalarValue::Utf8(self.inner.finalize().into_text()))
    }

    fn size(&self) -> usize {
        std::mem::size_of_val(self)
            + self
                .inner
                .values()
                .map(|value| value.capacity() + std::mem::size_of::<String>())
                .sum::<usize>()
    }

    fn state(&mut self) -> DataFusionResult<Vec<ScalarValue>> {
        let values: Vec<_> = self
            .inner
            .values()
            .map(|value| ScalarValue::Utf8(Some(value.clone())))
            .collect();
        Ok(vec![
            ScalarValue::List(ScalarValue::new_list_nullable(&values, &DataType::Utf8)),
            ScalarValue::UInt64(self.inner.capacity().map(|k| k as u64)),
        ])
    }

    fn merge_batch(&mut self, states: &[ArrayRef]) -> DataFusionResult<()> {
        let [values, capacities] = states else {
            return Err(DescriptivesError::invalid_argument(format!(
                "{} list expects 2 state columns, got {}",
                self.inner.policy(),
                states.len()
            ))
            .into());
        };
        let values = values
            .as_list_opt::<i32>()
            .ok_or_else(|| DescriptivesError::invalid_argument("list state must be a list"))?;
        let capacities = capacities
            .as_primitive_opt::<UInt64Type>()
            .ok_or_else(|| DescriptivesError::invalid_argument("list capacity must be UInt64"))?;

        for row in 0..values.len() {
            if values.is_null(row) || capacities.is_null(row) {
                continue;
            }
            let row_values = values.value(row);
            let row_values = row_values
                .as_string_opt::<i32>()
                .ok_or_else(|| DescriptivesError::invalid_argument("list values must be Utf8"))?;

            let mut partial = BoundedList::new(self.inner.policy());
            let capacity = capacities.value(row) as i64;
            partial.initialize(Some(capacity))?;
            for value in row_values.iter().flatten() {
                partial.update(value.to_string(), None)?;
            }
            self.inner.merge(partial)?;
        }
        Ok(())
    }
}
