//! Error types for sg-geo

use thiserror::Error;

/// Geo matching errors. All of them are configuration errors raised before
/// any subject is processed.
#[derive(Error, Debug)]
pub enum GeoError {
    /// G001: No reference locations
    #[error("[G001] Reference set is empty; nothing to match against")]
    EmptyReferenceSet,

    /// G002: Reference with unusable coordinates or id
    #[error("[G002] Invalid reference '{id}': {reason}")]
    InvalidReference { id: String, reason: String },

    /// G003: Two references share an id
    #[error("[G003] Duplicate reference id '{id}'")]
    DuplicateReference { id: String },

    /// G004: Input dataset lacks a column the matcher needs
    #[error("[G004] Dataset '{dataset}' has no column '{column}'")]
    MissingColumn { dataset: String, column: String },

    /// G005: Bad radius, epsilon or worker count
    #[error("[G005] Invalid matcher options: {message}")]
    InvalidOptions { message: String },
}

/// Result type alias for GeoError
pub type GeoResult<T> = Result<T, GeoError>;
