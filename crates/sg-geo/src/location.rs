//! Reference points, subjects and match results

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed comparison point, loaded once per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLocation {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl ReferenceLocation {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
        }
    }
}

/// A record being matched. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectLocation {
    pub id: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl SubjectLocation {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: Some(id.into()),
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }
}

/// Nearest reference for one subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub subject_id: String,
    pub nearest_reference_id: String,
    pub distance_km: f64,
}

/// Why a subject produced no match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Latitude or longitude is null
    MissingCoordinate,
    /// Latitude outside [-90, 90] or longitude outside [-180, 180]
    OutOfRange,
    /// NaN, infinite, or not a number at all
    NonFinite,
    /// Subject has no usable id
    MissingId,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SkipReason::MissingCoordinate => "missing_coordinate",
            SkipReason::OutOfRange => "out_of_range",
            SkipReason::NonFinite => "non_finite",
            SkipReason::MissingId => "missing_id",
        };
        f.write_str(name)
    }
}

/// Check a coordinate pair, returning it when usable
pub fn check_coordinates(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<(f64, f64), SkipReason> {
    let (Some(lat), Some(lon)) = (latitude, longitude) else {
        return Err(SkipReason::MissingCoordinate);
    };
    if !lat.is_finite() || !lon.is_finite() {
        return Err(SkipReason::NonFinite);
    }
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(SkipReason::OutOfRange);
    }
    Ok((lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_coordinates() {
        assert_eq!(check_coordinates(Some(34.0), Some(-118.0)), Ok((34.0, -118.0)));
        assert_eq!(check_coordinates(Some(90.0), Some(180.0)), Ok((90.0, 180.0)));
        assert_eq!(
            check_coordinates(None, Some(1.0)),
            Err(SkipReason::MissingCoordinate)
        );
        assert_eq!(
            check_coordinates(Some(f64::NAN), Some(1.0)),
            Err(SkipReason::NonFinite)
        );
        assert_eq!(
            check_coordinates(Some(1.0), Some(f64::INFINITY)),
            Err(SkipReason::NonFinite)
        );
        assert_eq!(
            check_coordinates(Some(90.5), Some(0.0)),
            Err(SkipReason::OutOfRange)
        );
        assert_eq!(
            check_coordinates(Some(0.0), Some(-180.1)),
            Err(SkipReason::OutOfRange)
        );
    }

    #[test]
    fn test_skip_reason_serialization() {
        assert_eq!(
            serde_json::to_string(&SkipReason::MissingCoordinate).unwrap(),
            "\"missing_coordinate\""
        );
        assert_eq!(SkipReason::NonFinite.to_string(), "non_finite");
    }
}
