//! Conversions between datasets and geo inputs/outputs

use crate::error::{GeoError, GeoResult};
use crate::location::{ReferenceLocation, SubjectLocation};
use crate::matcher::MatchOutcome;
use sg_core::{ColumnSchema, ColumnType, Dataset, DatasetId, Record, Value};

/// Output column holding the subject id
pub const SUBJECT_ID_COLUMN: &str = "subject_id";
/// Output column holding the matched reference id
pub const REFERENCE_ID_COLUMN: &str = "nearest_reference_id";
/// Output column holding the distance
pub const DISTANCE_COLUMN: &str = "distance_km";

fn require_column(dataset: &Dataset, column: &str) -> GeoResult<()> {
    if dataset.has_column(column) {
        Ok(())
    } else {
        Err(GeoError::MissingColumn {
            dataset: dataset.id().to_string(),
            column: column.to_string(),
        })
    }
}

fn id_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Non-null values that do not parse become NaN so they are skipped as
/// non-finite rather than as missing.
fn coordinate_of(value: &Value) -> Option<f64> {
    if value.is_null() {
        None
    } else {
        Some(value.as_f64().unwrap_or(f64::NAN))
    }
}

/// Read subjects from a dataset
pub fn subjects_from_dataset(
    dataset: &Dataset,
    id_column: &str,
    lat_column: &str,
    lon_column: &str,
) -> GeoResult<Vec<SubjectLocation>> {
    for column in [id_column, lat_column, lon_column] {
        require_column(dataset, column)?;
    }

    Ok(dataset
        .records()
        .iter()
        .map(|record| SubjectLocation {
            id: id_of(record.get(id_column)),
            latitude: coordinate_of(record.get(lat_column)),
            longitude: coordinate_of(record.get(lon_column)),
        })
        .collect())
}

/// Read references from a dataset. Any unusable row is an error.
pub fn references_from_dataset(
    dataset: &Dataset,
    id_column: &str,
    lat_column: &str,
    lon_column: &str,
) -> GeoResult<Vec<ReferenceLocation>> {
    for column in [id_column, lat_column, lon_column] {
        require_column(dataset, column)?;
    }

    dataset
        .records()
        .iter()
        .enumerate()
        .map(|(row, record)| {
            let id = id_of(record.get(id_column)).ok_or_else(|| GeoError::InvalidReference {
                id: format!("<row {}>", row + 1),
                reason: format!("null {}", id_column),
            })?;
            let coordinate = |column: &str| {
                record
                    .get(column)
                    .as_f64()
                    .ok_or_else(|| GeoError::InvalidReference {
                        id: id.clone(),
                        reason: format!("{} is null or not numeric", column),
                    })
            };
            let latitude = coordinate(lat_column)?;
            let longitude = coordinate(lon_column)?;
            Ok(ReferenceLocation {
                id,
                latitude,
                longitude,
            })
        })
        .collect()
}

impl MatchOutcome {
    /// Materialize matches as a dataset
    pub fn to_dataset(&self, id: DatasetId) -> Dataset {
        let columns = vec![
            ColumnSchema::new(SUBJECT_ID_COLUMN, Some(ColumnType::String)),
            ColumnSchema::new(REFERENCE_ID_COLUMN, Some(ColumnType::String)),
            ColumnSchema::new(DISTANCE_COLUMN, Some(ColumnType::Float)),
        ];
        let records = self
            .matches
            .iter()
            .map(|m| {
                Record::new()
                    .with(SUBJECT_ID_COLUMN, m.subject_id.as_str())
                    .with(REFERENCE_ID_COLUMN, m.nearest_reference_id.as_str())
                    .with(DISTANCE_COLUMN, m.distance_km)
            })
            .collect();
        Dataset::new(id, columns, records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::nearest;
    use sg_core::{RunId, StageName};

    fn id(stage: &str) -> DatasetId {
        DatasetId::new(StageName::new(stage), RunId::new("r1"))
    }

    #[test]
    fn test_subjects_from_dataset() {
        let ds = Dataset::from_records(
            id("facilities"),
            vec![
                Record::new()
                    .with("facility_id", 17i64)
                    .with("lat", 34.05)
                    .with("lon", "-118.13"),
                Record::new()
                    .with("facility_id", "F2")
                    .with("lat", Value::Null)
                    .with("lon", -118.0),
                Record::new()
                    .with("facility_id", "F3")
                    .with("lat", "unknown")
                    .with("lon", -118.0),
            ],
        );

        let subjects = subjects_from_dataset(&ds, "facility_id", "lat", "lon").unwrap();
        assert_eq!(subjects.len(), 3);
        assert_eq!(subjects[0].id.as_deref(), Some("17"));
        assert_eq!(subjects[0].longitude, Some(-118.13));
        assert_eq!(subjects[1].latitude, None);
        assert!(subjects[2].latitude.is_some_and(f64::is_nan));
    }

    #[test]
    fn test_missing_column() {
        let ds = Dataset::from_records(id("facilities"), vec![Record::new().with("lat", 1.0)]);
        let err = subjects_from_dataset(&ds, "facility_id", "lat", "lon").unwrap_err();
        assert!(matches!(err, GeoError::MissingColumn { ref column, .. } if column == "facility_id"));
    }

    #[test]
    fn test_reference_with_null_coordinate_is_error() {
        let ds = Dataset::from_records(
            id("dim_zip_geo"),
            vec![
                Record::new().with("zip", "91754").with("lat", 34.05).with("lon", -118.13),
                Record::new().with("zip", "91801").with("lat", Value::Null).with("lon", -118.12),
            ],
        );
        let err = references_from_dataset(&ds, "zip", "lat", "lon").unwrap_err();
        assert!(matches!(err, GeoError::InvalidReference { ref id, .. } if id == "91801"));
    }

    #[test]
    fn test_outcome_to_dataset() {
        let refs = vec![ReferenceLocation::new("a", 0.0, 0.0)];
        let outcome = nearest(&[SubjectLocation::new("s", 0.0, 0.5)], &refs).unwrap();
        let ds = outcome.to_dataset(id("geo_near_me"));

        assert_eq!(ds.len(), 1);
        assert_eq!(ds.columns().len(), 3);
        assert_eq!(ds.records()[0].get(REFERENCE_ID_COLUMN), &Value::from("a"));
        assert!(ds.records()[0].get(DISTANCE_COLUMN).as_f64().unwrap() > 55.0);
    }

    #[test]
    fn test_empty_outcome_keeps_schema() {
        let ds = MatchOutcome::default().to_dataset(id("geo_near_me"));
        assert!(ds.is_empty());
        assert!(ds.has_column(DISTANCE_COLUMN));
    }
}
