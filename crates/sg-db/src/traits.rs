//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use sg_core::{ColumnSchema, Dataset, DatasetId};
use std::path::Path;

/// Database abstraction used by the dataset store and the CLI
///
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute multiple SQL statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Row count of a query
    async fn query_count(&self, sql: &str) -> DbResult<usize>;

    /// Column names and declared types of a data file
    async fn describe(&self, path: &Path) -> DbResult<Vec<ColumnSchema>>;

    /// Row count of a data file
    async fn count_rows(&self, path: &Path) -> DbResult<usize>;

    /// Read a data file into a dataset
    async fn load_dataset(&self, id: DatasetId, path: &Path) -> DbResult<Dataset>;

    /// Write a dataset to a Parquet file
    async fn write_parquet(&self, dataset: &Dataset, path: &Path) -> DbResult<()>;

    /// Convert a data file to Parquet without touching its rows
    async fn copy_to_parquet(&self, source: &Path, dest: &Path) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
