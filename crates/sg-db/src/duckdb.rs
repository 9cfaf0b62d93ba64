//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use duckdb::types::Value as DuckValue;
use duckdb::{params_from_iter, Connection, Row};
use sg_core::{ColumnSchema, ColumnType, Dataset, DatasetId, Record, Value};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Staging table used while writing Parquet output
const WRITE_TABLE: &str = "__sg_write";

/// Timestamp text format handed to DuckDB casts (UTC, no offset)
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// How a column is projected and read back into a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadAs {
    Integer,
    Float,
    Boolean,
    Timestamp,
    Text,
}

impl ReadAs {
    fn for_type(data_type: &ColumnType) -> Self {
        match data_type {
            ColumnType::Integer => ReadAs::Integer,
            ColumnType::Float | ColumnType::Decimal | ColumnType::Number => ReadAs::Float,
            ColumnType::Boolean => ReadAs::Boolean,
            ColumnType::Date | ColumnType::Timestamp => ReadAs::Timestamp,
            _ => ReadAs::Text,
        }
    }

    fn projection(&self, column: &str) -> String {
        let col = quote_ident(column);
        match self {
            ReadAs::Integer => format!("CAST({} AS BIGINT)", col),
            ReadAs::Float => format!("CAST({} AS DOUBLE)", col),
            ReadAs::Boolean => col,
            ReadAs::Timestamp => format!("epoch_us(CAST({} AS TIMESTAMP))", col),
            ReadAs::Text => format!("CAST({} AS VARCHAR)", col),
        }
    }

    fn read(&self, row: &Row<'_>, idx: usize) -> duckdb::Result<Value> {
        let value = match self {
            ReadAs::Integer => row.get::<_, Option<i64>>(idx)?.map(Value::Integer),
            ReadAs::Float => row.get::<_, Option<f64>>(idx)?.map(Value::Float),
            ReadAs::Boolean => row.get::<_, Option<bool>>(idx)?.map(Value::Bool),
            ReadAs::Timestamp => row
                .get::<_, Option<i64>>(idx)?
                .and_then(DateTime::<Utc>::from_timestamp_micros)
                .map(Value::Timestamp),
            ReadAs::Text => row.get::<_, Option<String>>(idx)?.map(Value::String),
        };
        Ok(value.unwrap_or(Value::Null))
    }
}

/// Physical column type used when writing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteAs {
    Varchar,
    BigInt,
    Double,
    Boolean,
    Timestamp,
}

impl WriteAs {
    /// Untyped and mixed columns are written as text
    fn for_type(data_type: Option<&ColumnType>) -> Self {
        match data_type {
            Some(ColumnType::Integer) => WriteAs::BigInt,
            Some(ColumnType::Float | ColumnType::Decimal | ColumnType::Number) => WriteAs::Double,
            Some(ColumnType::Boolean) => WriteAs::Boolean,
            Some(ColumnType::Date | ColumnType::Timestamp) => WriteAs::Timestamp,
            _ => WriteAs::Varchar,
        }
    }

    fn sql(&self) -> &'static str {
        match self {
            WriteAs::Varchar => "VARCHAR",
            WriteAs::BigInt => "BIGINT",
            WriteAs::Double => "DOUBLE",
            WriteAs::Boolean => "BOOLEAN",
            WriteAs::Timestamp => "TIMESTAMP",
        }
    }

    fn param(&self, value: &Value) -> DuckValue {
        match (self, value) {
            (_, Value::Null) => DuckValue::Null,
            (WriteAs::Varchar, Value::Timestamp(t)) => {
                DuckValue::Text(t.format(TIMESTAMP_FORMAT).to_string())
            }
            (WriteAs::Varchar, other) => DuckValue::Text(other.to_string()),
            (_, Value::Bool(b)) => DuckValue::Boolean(*b),
            (_, Value::Integer(i)) => DuckValue::BigInt(*i),
            (_, Value::Float(f)) => DuckValue::Double(*f),
            (_, Value::Timestamp(t)) => DuckValue::Text(t.format(TIMESTAMP_FORMAT).to_string()),
            (_, Value::String(s)) => DuckValue::Text(s.clone()),
        }
    }
}

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    fn query_count_sync(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM ({})", sql), [], |row| {
                row.get(0)
            })
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;
        Ok(count as usize)
    }

    fn describe_sync(&self, conn: &Connection, source: &str) -> DbResult<Vec<(String, String)>> {
        let mut stmt = conn.prepare(&format!("DESCRIBE SELECT * FROM {}", source))?;
        let columns = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    fn load_dataset_sync(&self, id: DatasetId, path: &Path) -> DbResult<Dataset> {
        let source = scan_expr(path)?;
        let conn = self.lock()?;

        let described = self.describe_sync(&conn, &source)?;
        let columns: Vec<ColumnSchema> = described
            .iter()
            .map(|(name, raw_type)| ColumnSchema::new(name, Some(ColumnType::parse(raw_type))))
            .collect();
        let readers: Vec<ReadAs> = columns
            .iter()
            .map(|c| c.data_type.as_ref().map_or(ReadAs::Text, ReadAs::for_type))
            .collect();

        let projection = columns
            .iter()
            .zip(&readers)
            .map(|(c, r)| r.projection(&c.name))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT {} FROM {}", projection, source);

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                readers
                    .iter()
                    .enumerate()
                    .map(|(idx, reader)| reader.read(row, idx))
                    .collect::<duckdb::Result<Vec<Value>>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let records: Vec<Record> = rows
            .into_iter()
            .map(|values| {
                columns
                    .iter()
                    .zip(values)
                    .map(|(c, v)| (c.name.clone(), v))
                    .collect()
            })
            .collect();

        log::debug!(
            "Loaded {} rows x {} columns from {}",
            records.len(),
            columns.len(),
            path.display()
        );
        Ok(Dataset::new(id, columns, records))
    }

    fn write_parquet_sync(&self, dataset: &Dataset, path: &Path) -> DbResult<()> {
        if dataset.columns().is_empty() {
            return Err(DbError::ExecutionError(format!(
                "dataset {} has no columns to write",
                dataset.id()
            )));
        }

        let writers: Vec<WriteAs> = dataset
            .columns()
            .iter()
            .map(|c| WriteAs::for_type(c.data_type.as_ref()))
            .collect();
        let definitions = dataset
            .columns()
            .iter()
            .zip(&writers)
            .map(|(c, w)| format!("{} {}", quote_ident(&c.name), w.sql()))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = writers
            .iter()
            .map(|w| format!("CAST(? AS {})", w.sql()))
            .collect::<Vec<_>>()
            .join(", ");

        let conn = self.lock()?;
        conn.execute_batch(&format!(
            "CREATE OR REPLACE TEMP TABLE {} ({})",
            WRITE_TABLE, definitions
        ))?;
        {
            let mut insert =
                conn.prepare(&format!("INSERT INTO {} VALUES ({})", WRITE_TABLE, placeholders))?;
            for record in dataset.records() {
                let params = dataset
                    .columns()
                    .iter()
                    .zip(&writers)
                    .map(|(c, w)| w.param(record.get(&c.name)));
                insert.execute(params_from_iter(params))?;
            }
        }
        conn.execute_batch(&format!(
            "COPY {table} TO '{path}' (FORMAT PARQUET); DROP TABLE {table};",
            table = WRITE_TABLE,
            path = quote_literal(&path.display().to_string())
        ))?;

        log::debug!("Wrote {} rows to {}", dataset.len(), path.display());
        Ok(())
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.execute_batch_sync(sql)
    }

    async fn query_count(&self, sql: &str) -> DbResult<usize> {
        self.query_count_sync(sql)
    }

    async fn describe(&self, path: &Path) -> DbResult<Vec<ColumnSchema>> {
        let source = scan_expr(path)?;
        let conn = self.lock()?;
        Ok(self
            .describe_sync(&conn, &source)?
            .into_iter()
            .map(|(name, raw_type)| ColumnSchema::new(name, Some(ColumnType::parse(&raw_type))))
            .collect())
    }

    async fn count_rows(&self, path: &Path) -> DbResult<usize> {
        let source = scan_expr(path)?;
        self.query_count_sync(&format!("SELECT * FROM {}", source))
    }

    async fn load_dataset(&self, id: DatasetId, path: &Path) -> DbResult<Dataset> {
        self.load_dataset_sync(id, path)
    }

    async fn write_parquet(&self, dataset: &Dataset, path: &Path) -> DbResult<()> {
        self.write_parquet_sync(dataset, path)
    }

    async fn copy_to_parquet(&self, source: &Path, dest: &Path) -> DbResult<()> {
        let scan = scan_expr(source)?;
        self.execute_batch_sync(&format!(
            "COPY (SELECT * FROM {}) TO '{}' (FORMAT PARQUET)",
            scan,
            quote_literal(&dest.display().to_string())
        ))
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

/// Table function reading a data file, chosen by extension
fn scan_expr(path: &Path) -> DbResult<String> {
    if !path.exists() {
        return Err(DbError::FileNotFound(path.display().to_string()));
    }
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let literal = quote_literal(&path.display().to_string());

    match extension.as_str() {
        "csv" => Ok(format!("read_csv_auto('{}', header = true)", literal)),
        "tsv" => Ok(format!(
            "read_csv_auto('{}', header = true, delim = '\\t')",
            literal
        )),
        "parquet" => Ok(format!("read_parquet('{}')", literal)),
        "json" | "jsonl" | "ndjson" => Ok(format!("read_json_auto('{}')", literal)),
        _ => Err(DbError::UnsupportedFormat {
            path: path.display().to_string(),
            extension,
        }),
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn quote_literal(value: &str) -> String {
    value.replace('\'', "''")
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
