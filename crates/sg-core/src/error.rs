//! Error types for sg-core

use thiserror::Error;

/// Core error type for Stagegate
///
/// Everything here is a configuration-class failure: it is raised before any
/// dataset is evaluated and always ends the run.
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Invalid configuration value
    #[error("[E002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E003: Contract file is malformed or internally inconsistent
    #[error("[E003] Invalid contract for stage '{stage}': {message}")]
    ContractInvalid { stage: String, message: String },

    /// E004: No contract declared for a stage
    #[error("[E004] No contract found for stage '{stage}'")]
    ContractNotFound { stage: String },

    /// E005: Two contract files declare the same stage
    #[error("[E005] Duplicate contract for stage '{stage}' in {path1} and {path2}")]
    DuplicateContract {
        stage: String,
        path1: String,
        path2: String,
    },

    /// E006: Stage declared more than once in config
    #[error("[E006] Duplicate stage name: {name}")]
    DuplicateStage { name: String },

    /// E007: Circular dependency between stages
    #[error("[E007] Circular stage dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// E008: Reference to a stage that is not declared
    #[error("[E008] Unknown stage '{name}' referenced by {context}")]
    UnknownStage { name: String, context: String },

    /// E009: Name not usable as a stage or run identifier
    #[error("[E009] Invalid name in {context}: names must be non-empty with no surrounding whitespace or path separators")]
    InvalidName { context: String },

    /// E010: Upstream stage has no report for this run
    #[error("[E010] Upstream stage '{upstream}' has no validation report for run '{run_id}'; run and validate it before '{stage}'")]
    UpstreamNotValidated {
        stage: String,
        upstream: String,
        run_id: String,
    },

    /// E011: Upstream stage report exists but failed
    #[error("[E011] Upstream stage '{upstream}' failed validation in run '{run_id}' ({violations} violation(s)); '{stage}' may not consume it")]
    UpstreamFailed {
        stage: String,
        upstream: String,
        run_id: String,
        violations: usize,
    },

    /// E012: IO error
    #[error("[E012] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E013: IO error with file path context
    #[error("[E013] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E014: YAML parse error
    #[error("[E014] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// E015: Invalid glob pattern while discovering contracts
    #[error("[E015] Invalid contract path pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
