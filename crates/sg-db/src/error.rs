//! Error types for sg-db

use thiserror::Error;

/// Database and dataset store errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Input file missing (D003)
    #[error("[D003] Input file not found: {0}")]
    FileNotFound(String),

    /// File extension not readable (D004)
    #[error("[D004] Unsupported file format '{extension}' for {path} (expected csv, tsv, parquet or json)")]
    UnsupportedFormat { path: String, extension: String },

    /// Mutex poisoned (D005)
    #[error("[D005] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Dataset already written (D006)
    #[error("[D006] Dataset already exists at {path}; datasets are never overwritten, use a new run id")]
    AlreadyExists { path: String },

    /// Stage output aimed at the raw zone (D007)
    #[error("[D007] Stage '{stage}' is a raw stage; raw snapshots can only be ingested, not written")]
    RawZoneWrite { stage: String },

    /// Ingest aimed outside the raw zone (D008)
    #[error("[D008] Stage '{stage}' is not a raw stage; only raw stages accept ingested snapshots")]
    NotRawStage { stage: String },

    /// Filesystem error (D009)
    #[error("[D009] IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        DbError::ExecutionError(err.to_string())
    }
}
