//! In-memory datasets
//!
//! A [`Dataset`] is one stage's output for one run: an ordered sequence of
//! records sharing a schema. Nothing in Stagegate mutates a dataset after it
//! is built; stages produce new datasets instead.

use crate::column_type::ColumnType;
use crate::names::DatasetId;
use crate::value::{Record, Value};
use serde::{Deserialize, Serialize};

/// One column of a dataset schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name
    pub name: String,
    /// Observed type; `None` when nothing could be observed (all values null)
    pub data_type: Option<ColumnType>,
}

impl ColumnSchema {
    /// Create a column schema
    pub fn new(name: impl Into<String>, data_type: Option<ColumnType>) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// An ordered, immutable set of records with a shared schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    id: DatasetId,
    columns: Vec<ColumnSchema>,
    records: Vec<Record>,
}

impl Dataset {
    /// Build a dataset from an explicit schema (e.g. DuckDB `DESCRIBE` output)
    pub fn new(id: DatasetId, columns: Vec<ColumnSchema>, records: Vec<Record>) -> Self {
        Self {
            id,
            columns,
            records,
        }
    }

    /// Build a dataset from records alone, inferring the schema.
    ///
    /// Columns are ordered by first appearance. A column's type is the kind of
    /// its non-null values; if those disagree the column is typed as
    /// [`ColumnType::mixed`], and if every value is null it has no type.
    pub fn from_records(id: DatasetId, records: Vec<Record>) -> Self {
        let mut columns: Vec<ColumnSchema> = Vec::new();

        for record in &records {
            for (name, value) in record.iter() {
                let observed = ColumnType::of_value(value);
                match columns.iter_mut().find(|c| c.name == name) {
                    None => columns.push(ColumnSchema::new(name, observed)),
                    Some(column) => {
                        column.data_type = match (column.data_type.take(), observed) {
                            (None, observed) => observed,
                            (Some(current), None) => Some(current),
                            (Some(current), Some(observed)) if current == observed => {
                                Some(current)
                            }
                            (Some(_), Some(_)) => Some(ColumnType::mixed()),
                        };
                    }
                }
            }
        }

        Self::new(id, columns, records)
    }

    /// Dataset identity
    pub fn id(&self) -> &DatasetId {
        &self.id
    }

    /// Schema columns in order
    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    /// Records in arrival order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a column's schema by exact name
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Whether the schema contains a column
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// All values of one column in record order (null where a record lacks it)
    pub fn values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.records.iter().map(move |r| r.get(column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::{RunId, StageName};

    fn id() -> DatasetId {
        DatasetId::new(StageName::new("stg"), RunId::new("r1"))
    }

    #[test]
    fn test_from_records_infers_types() {
        let ds = Dataset::from_records(
            id(),
            vec![
                Record::new().with("id", "a").with("score", 1.5),
                Record::new().with("id", "b").with("score", Value::Null),
            ],
        );
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.column("id").unwrap().data_type, Some(ColumnType::String));
        assert_eq!(ds.column("score").unwrap().data_type, Some(ColumnType::Float));
    }

    #[test]
    fn test_all_null_column_has_no_type() {
        let ds = Dataset::from_records(
            id(),
            vec![Record::new().with("note", Value::Null)],
        );
        assert_eq!(ds.column("note").unwrap().data_type, None);
    }

    #[test]
    fn test_mixed_column() {
        let ds = Dataset::from_records(
            id(),
            vec![
                Record::new().with("zip", "91754"),
                Record::new().with("zip", 91754_i64),
            ],
        );
        assert_eq!(ds.column("zip").unwrap().data_type, Some(ColumnType::mixed()));
    }

    #[test]
    fn test_values_fill_missing_with_null() {
        let ds = Dataset::from_records(
            id(),
            vec![Record::new().with("a", 1_i64), Record::new().with("b", 2_i64)],
        );
        let a: Vec<&Value> = ds.values("a").collect();
        assert_eq!(a, vec![&Value::Integer(1), &Value::Null]);
    }
}
