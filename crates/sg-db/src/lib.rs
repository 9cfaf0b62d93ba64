//! sg-db - DuckDB access layer for Stagegate
//!
//! This crate provides the `Database` trait, its DuckDB implementation for
//! reading CSV/Parquet/JSON files into datasets and writing Parquet, and the
//! write-once `DatasetStore`.

pub mod duckdb;
pub mod error;
pub mod store;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use store::DatasetStore;
pub use traits::Database;
