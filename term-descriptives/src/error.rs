//! Error types for the descriptive statistics engine.
//!
//! All fallible operations in this crate return [`DescriptivesError`]. An
//! empty distribution is never an error: it shows up as `None`, a NULL
//! aggregate result, or an empty summary record.

use datafusion::error::DataFusionError;
use thiserror::Error;

/// The main error type for term-descriptives.
#[derive(Error, Debug)]
pub enum DescriptivesError {
    /// An argument was outside its accepted domain (percentile outside
    /// `[0, 1]`, non-positive list capacity, malformed declared column type,
    /// unusable identifier).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A non-numeric observation reached a statistical accumulator.
    #[error("Unsupported value type for {aggregate}: {found}")]
    UnsupportedValueType {
        /// Name of the aggregate that rejected the value
        aggregate: String,
        /// The offending data type
        found: String,
    },

    /// A referenced table is not registered in the session.
    #[error("Table '{table}' not found")]
    TableNotFound { table: String },

    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] DataFusionError),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// A type alias for `Result<T, DescriptivesError>`.
pub type Result<T> = std::result::Result<T, DescriptivesError>;

impl DescriptivesError {
    /// Creates an invalid argument error with the given message.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates an unsupported value type error.
    pub fn unsupported_value_type(aggregate: impl Into<String>, found: impl ToString) -> Self {
        Self::UnsupportedValueType {
            aggregate: aggregate.into(),
            found: found.to_string(),
        }
    }

    /// Creates a configuration error with the given message.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

impl From<serde_json::Error> for DescriptivesError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Aggregates hand errors back to DataFusion as external errors so the
/// original error stays reachable through `source()`.
impl From<DescriptivesError> for DataFusionError {
    fn from(err: DescriptivesError) -> Self {
        match err {
            DescriptivesError::DataFusion(inner) => inner,
            other => DataFusionError::External(Box::new(other)),
        }
    }
}
