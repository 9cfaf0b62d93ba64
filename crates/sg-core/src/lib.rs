//! sg-core - Core library for Stagegate
//!
//! This crate provides the shared data model (values, records, datasets),
//! stage contracts and their compiled rule sets, project configuration, the
//! stage DAG, and the per-run ledger used by every other Stagegate crate.

pub mod checksum;
pub mod column_type;
pub mod config;
pub mod contract;
pub mod dag;
pub mod dataset;
pub mod error;
pub mod names;
mod newtype_string;
pub mod rules;
pub mod run_ledger;
pub mod value;

pub use checksum::{compute_checksum, compute_file_checksum};
pub use column_type::ColumnType;
pub use config::{Config, GeoConfig, StageConfig};
pub use contract::{load_contracts, Contract, RowCountRelation, ValueRange};
pub use dag::StageDag;
pub use dataset::{ColumnSchema, Dataset};
pub use error::{CoreError, CoreResult};
pub use names::{DatasetId, RunId, StageName};
pub use rules::Rule;
pub use run_ledger::{RawCheck, RunLedger};
pub use value::{KeyPart, Record, Value};
