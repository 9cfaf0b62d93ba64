//! sg-geo - Nearest-reference geo matching for Stagegate
//!
//! Assigns each subject location its nearest reference location by
//! haversine distance. Subjects with unusable coordinates are skipped and
//! counted; an empty or invalid reference set is rejected up front.

pub mod dataset;
pub mod error;
pub mod haversine;
pub mod location;
pub mod matcher;
pub mod summary;

pub use dataset::{references_from_dataset, subjects_from_dataset};
pub use error::{GeoError, GeoResult};
pub use haversine::{haversine_km, EARTH_RADIUS_KM};
pub use location::{MatchResult, ReferenceLocation, SkipReason, SubjectLocation};
pub use matcher::{nearest, GeoMatcher, MatchOptions, MatchOutcome};
pub use summary::GeoSummary;
