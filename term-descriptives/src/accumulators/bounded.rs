//! Fixed-capacity list accumulators behind `first(x, k)` and `last(x, k)`.

use std::collections::VecDeque;
use std::fmt;

use crate::error::{DescriptivesError, Result};

/// Separator used when more than one value is returned.
pub const LIST_DELIMITER: &str = ";";

/// Capacity used when the first update does not supply one.
pub const DEFAULT_CAPACITY: usize = 1;

/// Which observations a [`BoundedList`] keeps once it is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListPolicy {
    /// Keep the first `K` values and ignore the rest.
    First,
    /// Keep a sliding window of the latest `K` values.
    Last,
}

impl fmt::Display for ListPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListPolicy::First => write!(f, "first"),
            ListPolicy::Last => write!(f, "last"),
        }
    }
}

/// Finalized value of a bounded list.
#[derive(Debug, Clone, PartialEq)]
pub enum ListOutput<T> {
    /// Nothing was captured.
    Null,
    /// Exactly one value, returned as is.
    Single(T),
    /// Several values joined with [`LIST_DELIMITER`] in retained order.
    Joined(String),
}

impl<T: fmt::Display> ListOutput<T> {
    /// Renders the output as text, `None` for [`ListOutput::Null`].
    pub fn into_text(self) -> Option<String> {
        match self {
            ListOutput::Null => None,
            ListOutput::Single(value) => Some(value.to_string()),
            ListOutput::Joined(joined) => Some(joined),
        }
    }
}

/// Bounded collector of observed values.
///
/// Capacity is fixed by the first update and never changes afterwards;
/// capacities passed to later updates are ignored. Memory never exceeds the
/// capacity regardless of how many values are offered.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedList<T> {
    policy: ListPolicy,
    default_capacity: usize,
    capacity: Option<usize>,
    values: VecDeque<T>,
}

impl<T> BoundedList<T> {
    /// Creates an uninitialized list with the given policy.
    pub fn new(policy: ListPolicy) -> Self {
        Self {
            policy,
            default_capacity: DEFAULT_CAPACITY,
            capacity: None,
            values: VecDeque::new(),
        }
    }

    pub fn first() -> Self {
        Self::new(ListPolicy::First)
    }

    pub fn last() -> Self {
        Self::new(ListPolicy::Last)
    }

    /// Overrides the capacity used when the first update carries none.
    pub fn with_default_capacity(mut self, capacity: usize) -> Self {
        self.default_capacity = capacity;
        self
    }

    pub fn policy(&self) -> ListPolicy {
        self.policy
    }

    /// The established capacity, `None` before the first update.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True once a first-K list holds `K` values. Last-K lists never stop.
    pub fn is_full(&self) -> bool {
        self.policy == ListPolicy::First
            && self
                .capacity
                .is_some_and(|capacity| self.values.len() >= capacity)
    }

    /// Captured values in retained order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    /// Establishes the capacity if this is the first use.
    ///
    /// Returns the capacity in effect. Fails for a non-positive capacity.
    pub fn initialize(&mut self, capacity: Option<i64>) -> Result<usize> {
        if let Some(established) = self.capacity {
            return Ok(established);
        }
        let requested = capacity.unwrap_or(self.default_capacity as i64);
        if requested <= 0 {
            return Err(DescriptivesError::invalid_argument(format!(
                "{} list capacity must be positive, got {requested}",
                self.policy
            )));
        }
        let established = usize::try_from(requested).map_err(|_| {
            DescriptivesError::invalid_argument(format!("list capacity {requested} too large"))
        })?;
        self.capacity = Some(established);
        Ok(established)
    }

    /// Per-row update.
    ///
    /// `capacity` only matters on the first call.
    pub fn update(&mut self, value: T, capacity: Option<i64>) -> Result<()> {
        let capacity = self.initialize(capacity)?;
        self.push(value, capacity);
        Ok(())
    }

    fn push(&mut self, value: T, capacity: usize) {
        match self.policy {
            ListPolicy::First => {
                if self.values.len() < capacity {
                    self.values.push_back(value);
                }
            }
            ListPolicy::Last => {
                self.values.push_back(value);
                while self.values.len() > capacity {
                    self.values.pop_front();
                }
            }
        }
    }

    /// Appends the values of a partial list as if they arrived after ours.
    pub fn merge(&mut self, other: BoundedList<T>) -> Result<()> {
        let Some(other_capacity) = other.capacity else {
            return Ok(());
        };
        let capacity = self.initialize(Some(other_capacity as i64))?;
        for value in other.values {
            self.push(value, capacity);
        }
        Ok(())
    }
}

impl<T: Clone + fmt::Display> BoundedList<T> {
    /// Produces the group result: null, the single value, or the joined list.
    pub fn finalize(&self) -> ListOutput<T> {
        match self.values.len() {
            0 => ListOutput::Null,
            1 => match self.values.front() {
                Some(value) => ListOutput::Single(value.clone()),
                None => ListOutput::Null,
            },
            _ => ListOutput::Joined(
                self.values
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(LIST_DELIMITER),
            ),
        }
    }
}
