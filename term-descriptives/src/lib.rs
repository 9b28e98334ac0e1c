//! # Term Descriptives - Exact Streaming Statistics for DataFusion
//!
//! Term Descriptives adds descriptive-statistics aggregates to DataFusion.
//! Values are folded into an exact frequency table as they stream past, and
//! the summary is computed from that table when the group finalizes. There is
//! no sampling and no sketching: percentiles, the median and the mode are the
//! true values of the data seen.
//!
//! ## Quick Start
//!
//! ```rust
//! use term_descriptives::prelude::*;
//! use arrow::array::Float64Array;
//! use arrow::datatypes::{DataType, Field, Schema};
//! use arrow::record_batch::RecordBatch;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let session = DescriptivesSession::with_config(DescriptivesConfig::ordered())?;
//!
//! let schema = Arc::new(Schema::new(vec![Field::new("price", DataType::Float64, true)]));
//! let prices = Float64Array::from(vec![1.0, 2.0, 2.0, 3.0, 4.0]);
//! session.register_batch("trades", RecordBatch::try_new(schema, vec![Arc::new(prices)])?)?;
//!
//! let summary = session.describe_column("trades", "price").await?;
//! assert_eq!(summary.n, Some(5));
//! assert_eq!(summary.median, Some(2.0));
//! assert_eq!(session.mode_of("trades", "price").await?, Some(2.0));
//!
//! let recent = session.last_values("trades", "price", 2).await?;
//! assert_eq!(recent.as_deref(), Some("3.0;4.0"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Aggregates
//!
//! | SQL                  | Result                                         |
//! |----------------------|------------------------------------------------|
//! | `descriptives(x)`    | JSON record with n, mean, variance, quartiles… |
//! | `mode(x)`            | most frequent value                            |
//! | `mode_freq(x)`       | `"value;count"`                                |
//! | `first(x [, k])`     | first `k` values joined with `;`               |
//! | `last(x [, k])`      | last `k` values joined with `;`                |
//!
//! The aggregates can be registered on any [`SessionContext`] with
//! [`udaf::register_aggregates`]; [`session::DescriptivesSession`] does so on
//! construction and adds a few convenience helpers.
//!
//! ## Architecture
//!
//! - **`accumulators`**: engine-independent accumulators and the statistics
//!   computed over a frequency table
//! - **`udaf`**: DataFusion `AggregateUDFImpl` bindings
//! - **`session`**: session wrapper with table introspection
//! - **`column_types`**: declared column types mapped onto Arrow types
//! - **`config`**, **`logging`**, **`error`**, **`security`**: ambient support
//!
//! [`SessionContext`]: datafusion::execution::context::SessionContext

pub mod accumulators;
pub mod column_types;
pub mod config;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod security;
pub mod session;
pub mod udaf;
