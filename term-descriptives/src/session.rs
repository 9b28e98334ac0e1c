//! DataFusion session with the descriptive aggregates pre-registered.
//!
//! [`DescriptivesSession`] wraps a [`SessionContext`], registers every
//! aggregate from [`crate::udaf`] when it is created, and adds a few helpers
//! for table introspection and one-shot column summaries.

use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use datafusion::common::ScalarValue;
use datafusion::execution::context::{SessionConfig, SessionContext};
use datafusion::execution::memory_pool::{FairSpillPool, MemoryPool};
use datafusion::execution::runtime_env::RuntimeEnvBuilder;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::accumulators::DescriptiveSummary;
use crate::column_types::column_title;
use crate::config::DescriptivesConfig;
use crate::error::{DescriptivesError, Result};
use crate::log_query;
use crate::logging::{truncate_field, LogConfig};
use crate::security::{quote_identifier, validate_identifier};
use crate::udaf::{self, register_aggregates};

/// One column of a registered table, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescription {
    /// Zero-based position in the table schema
    pub order: usize,
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl ColumnDescription {
    /// Display title derived from the column name.
    pub fn title(&self) -> String {
        column_title(&self.name)
    }
}

/// A DataFusion session that understands `descriptives`, `mode`,
/// `mode_freq`, `first` and `last`.
///
/// # Examples
///
/// ```rust,no_run
/// use term_descriptives::session::DescriptivesSession;
///
/// # async fn example() -> term_descriptives::error::Result<()> {
/// let session = DescriptivesSession::new()?;
/// // ... register tables ...
/// let summary = session.describe_column("trades", "price").await?;
/// println!("{summary}");
/// # Ok(())
/// # }
/// ```
pub struct DescriptivesSession {
    inner: SessionContext,
    config: DescriptivesConfig,
    log_config: LogConfig,
}

impl DescriptivesSession {
    /// Creates a session with default configuration.
    #[instrument]
    pub fn new() -> Result<Self> {
        Self::with_config(DescriptivesConfig::default())
    }

    /// Creates a session with custom configuration.
    #[instrument(skip(config))]
    pub fn with_config(config: DescriptivesConfig) -> Result<Self> {
        config.validate()?;

        let session_config = SessionConfig::new()
            .with_batch_size(config.batch_size)
            .with_target_partitions(config.target_partitions)
            .with_information_schema(true);

        let pool_size = (config.max_memory as f64 * config.memory_fraction) as usize;
        let memory_pool = Arc::new(FairSpillPool::new(pool_size)) as Arc<dyn MemoryPool>;

        let runtime_env = RuntimeEnvBuilder::new()
            .with_memory_pool(memory_pool)
            .build()
            .map(Arc::new)?;

        let inner = SessionContext::new_with_config_rt(session_config, runtime_env);
        Self::from_context(inner, config)
    }

    /// Adopts an existing context, registering the aggregates on it.
    pub fn from_context(ctx: SessionContext, config: DescriptivesConfig) -> Result<Self> {
        config.validate()?;
        register_aggregates(&ctx, config.default_list_capacity);
        debug!(
            target_partitions = config.target_partitions,
            default_list_capacity = config.default_list_capacity,
            "descriptives session ready"
        );
        Ok(Self {
            inner: ctx,
            config,
            log_config: LogConfig::default(),
        })
    }

    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Returns the underlying DataFusion [`SessionContext`].
    pub fn inner(&self) -> &SessionContext {
        &self.inner
    }

    pub fn config(&self) -> &DescriptivesConfig {
        &self.config
    }

    /// Registers an in-memory batch as a table.
    #[instrument(skip(self, batch), fields(rows = batch.num_rows()))]
    pub fn register_batch(&self, name: &str, batch: RecordBatch) -> Result<()> {
        validate_identifier(name)?;
        self.inner.register_batch(name, batch)?;
        Ok(())
    }

    /// Names of the tables in the default schema, sorted.
    pub fn tables(&self) -> Result<Vec<String>> {
        let session_config = self.inner.copied_config();
        let defaults = &session_config.options().catalog;
        let schema = self
            .inner
            .catalog(&defaults.default_catalog)
            .and_then(|catalog| catalog.schema(&defaults.default_schema))
            .ok_or_else(|| {
                DescriptivesError::configuration(format!(
                    "default schema {}.{} is missing",
                    defaults.default_catalog, defaults.default_schema
                ))
            })?;

        let mut names = schema.table_names();
        names.sort();
        Ok(names)
    }

    /// Describes the columns of `table` in schema order.
    #[instrument(skip(self))]
    pub async fn table_info(&self, table: &str) -> Result<Vec<ColumnDescription>> {
        validate_identifier(table)?;
        if !self.inner.table_exist(table)? {
            return Err(DescriptivesError::TableNotFound {
                table: table.to_string(),
            });
        }

        let provider = self.inner.table_provider(table).await?;
        Ok(provider
            .schema()
            .fields()
            .iter()
            .enumerate()
            .map(|(order, field)| ColumnDescription {
                order,
                name: field.name().clone(),
                data_type: field.data_type().clone(),
                nullable: field.is_nullable(),
            })
            .collect())
    }

    /// Runs `descriptives(column)` over the whole table.
    #[instrument(skip(self))]
    pub async fn describe_column(&self, table: &str, column: &str) -> Result<DescriptiveSummary> {
        let sql = self.aggregate_sql(udaf::DESCRIPTIVES, table, column, None)?;
        match self.scalar_query(&sql).await? {
            ScalarValue::Utf8(Some(json)) => DescriptiveSummary::from_json(&json),
            ScalarValue::Utf8(None) => Ok(DescriptiveSummary::default()),
            other => Err(DescriptivesError::Serialization(format!(
                "descriptives returned {}",
                other.data_type()
            ))),
        }
    }

    /// Runs `mode(column)` over the whole table.
    #[instrument(skip(self))]
    pub async fn mode_of(&self, table: &str, column: &str) -> Result<Option<f64>> {
        let sql = self.aggregate_sql(udaf::MODE, table, column, None)?;
        match self.scalar_query(&sql).await? {
            ScalarValue::Float64(mode) => Ok(mode),
            other => Err(DescriptivesError::Serialization(format!(
                "mode returned {}",
                other.data_type()
            ))),
        }
    }

    /// Runs `first(column, k)` in scan order.
    pub async fn first_values(&self, table: &str, column: &str, k: i64) -> Result<Option<String>> {
        let sql = self.aggregate_sql(udaf::FIRST, table, column, Some(k))?;
        self.text_query(&sql).await
    }

    /// Runs `last(column, k)` in scan order.
    pub async fn last_values(&self, table: &str, column: &str, k: i64) -> Result<Option<String>> {
        let sql = self.aggregate_sql(udaf::LAST, table, column, Some(k))?;
        self.text_query(&sql).await
    }

    fn aggregate_sql(
        &self,
        aggregate: &str,
        table: &str,
        column: &str,
        capacity: Option<i64>,
    ) -> Result<String> {
        let table = quote_identifier(table)?;
        let column = quote_identifier(column)?;
        Ok(match capacity {
            Some(k) => format!("SELECT {aggregate}({column}, {k}) FROM {table}"),
            None => format!("SELECT {aggregate}({column}) FROM {table}"),
        })
    }

    async fn text_query(&self, sql: &str) -> Result<Option<String>> {
        match self.scalar_query(sql).await? {
            ScalarValue::Utf8(text) => Ok(text),
            other => Err(DescriptivesError::Serialization(format!(
                "expected text result, got {}",
                other.data_type()
            ))),
        }
    }

    /// Executes a single-value query and returns that value.
    async fn scalar_query(&self, sql: &str) -> Result<ScalarValue> {
        log_query!(
            self.log_config,
            sql = %truncate_field(sql, self.log_config.max_field_length),
            "running aggregate query"
        );
        let batches = self.inner.sql(sql).await?.collect().await?;
        let batch = batches
            .iter()
            .find(|batch| batch.num_rows() > 0)
            .ok_or_else(|| {
                DescriptivesError::Serialization(format!("query returned no rows: {sql}"))
            })?;
        Ok(ScalarValue::try_from_array(batch.column(0), 0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_sql_quotes_identifiers() {
        let session = DescriptivesSession::with_config(DescriptivesConfig::ordered()).unwrap();
        assert_eq!(
            session
                .aggregate_sql("descriptives", "trades", "price", None)
                .unwrap(),
            r#"SELECT descriptives("price") FROM "trades""#
        );
        assert_eq!(
            session.aggregate_sql("last", "trades", "price", Some(3)).unwrap(),
            r#"SELECT last("price", 3) FROM "trades""#
        );
        assert!(session
            .aggregate_sql("mode", "trades; DROP TABLE trades", "price", None)
            .is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result =
            DescriptivesSession::with_config(DescriptivesConfig::default().with_batch_size(0));
        assert!(matches!(result, Err(DescriptivesError::Configuration(_))));
    }

    #[test]
    fn test_with_log_config() {
        let session = DescriptivesSession::new()
            .unwrap()
            .with_log_config(LogConfig::production());
        assert!(!session.log_config.log_queries);
        assert_eq!(session.log_config.max_field_length, 128);
    }

    #[test]
    fn test_new_session_has_no_tables() {
        let session = DescriptivesSession::new().unwrap();
        assert!(session.tables().unwrap().is_empty());
    }
}
