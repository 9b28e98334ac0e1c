//! Configuration for [`DescriptivesSession`](crate::session::DescriptivesSession).

use crate::error::{DescriptivesError, Result};

/// Settings for the DataFusion session hosting the aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptivesConfig {
    /// Batch size for query execution
    pub batch_size: usize,
    /// Target number of partitions for parallel execution
    pub target_partitions: usize,
    /// Maximum memory for query execution (in bytes)
    pub max_memory: usize,
    /// Memory fraction to use before spilling (0.0 to 1.0)
    pub memory_fraction: f64,
    /// List size for `first(x)` / `last(x)` called without `k`
    pub default_list_capacity: usize,
}

impl Default for DescriptivesConfig {
    fn default() -> Self {
        Self {
            batch_size: 8192,
            target_partitions: std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4),
            max_memory: 2 * 1024 * 1024 * 1024, // 2GB
            memory_fraction: 0.9,
            default_list_capacity: 1,
        }
    }
}

impl DescriptivesConfig {
    /// Single-partition configuration.
    ///
    /// `first`/`last` follow scan order, which is only stable when rows are
    /// not repartitioned.
    pub fn ordered() -> Self {
        Self {
            target_partitions: 1,
            ..Self::default()
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_target_partitions(mut self, target_partitions: usize) -> Self {
        self.target_partitions = target_partitions;
        self
    }

    pub fn with_max_memory(mut self, max_memory: usize) -> Self {
        self.max_memory = max_memory;
        self
    }

    pub fn with_memory_fraction(mut self, memory_fraction: f64) -> Self {
        self.memory_fraction = memory_fraction;
        self
    }

    pub fn with_default_list_capacity(mut self, capacity: usize) -> Self {
        self.default_list_capacity = capacity;
        self
    }

    /// Checks every field for a usable value.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(DescriptivesError::configuration("batch_size must be positive"));
        }
        if self.target_partitions == 0 {
            return Err(DescriptivesError::configuration(
                "target_partitions must be positive",
            ));
        }
        if self.max_memory == 0 {
            return Err(DescriptivesError::configuration("max_memory must be positive"));
        }
        if !(self.memory_fraction > 0.0 && self.memory_fraction <= 1.0) {
            return Err(DescriptivesError::configuration(format!(
                "memory_fraction must be in (0, 1], got {}",
                self.memory_fraction
            )));
        }
        if self.default_list_capacity == 0 {
            return Err(DescriptivesError::configuration(
                "default_list_capacity must be positive",
            ));
        }
        Ok(())
    }
}
