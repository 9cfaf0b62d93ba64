use super::*;
use crate::duckdb::DuckDbBackend;
use sg_core::{ColumnType, Record};
use tempfile::TempDir;

fn store(dir: &TempDir) -> DatasetStore {
    DatasetStore::new(dir.path(), vec![StageName::new("raw_inspections")])
}

fn dataset(stage: &str, run: &str) -> Dataset {
    Dataset::from_records(
        DatasetId::new(StageName::new(stage), RunId::new(run)),
        vec![Record::new().with("serial_number", "PR1")],
    )
}

#[test]
fn test_path_layout() {
    let store = DatasetStore::new("/data", Vec::new());
    let id = DatasetId::new(StageName::new("stg_inspections"), RunId::new("a1b2"));
    assert_eq!(
        store.path_for(&id),
        PathBuf::from("/data/stg_inspections/a1b2.parquet")
    );
}

#[tokio::test]
async fn test_write_then_exists() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let db = DuckDbBackend::in_memory().unwrap();
    let ds = dataset("stg_inspections", "r1");

    let path = store.write(&db, &ds).await.unwrap();
    assert!(path.exists());
    assert!(store.exists(ds.id()));
    assert!(!temp_path(&path).exists());
}

#[tokio::test]
async fn test_write_is_once_only() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let db = DuckDbBackend::in_memory().unwrap();
    let ds = dataset("stg_inspections", "r1");

    store.write(&db, &ds).await.unwrap();
    let second = store.write(&db, &ds).await;
    assert!(matches!(second, Err(DbError::AlreadyExists { .. })));

    // A new run id is the way to supersede
    store.write(&db, &dataset("stg_inspections", "r2")).await.unwrap();
    assert_eq!(
        store.runs("stg_inspections").unwrap(),
        vec![RunId::new("r1"), RunId::new("r2")]
    );
}

#[tokio::test]
async fn test_raw_zone_refuses_stage_output() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let db = DuckDbBackend::in_memory().unwrap();

    let result = store.write(&db, &dataset("raw_inspections", "r1")).await;
    assert!(matches!(result, Err(DbError::RawZoneWrite { .. })));
    assert!(store.runs("raw_inspections").unwrap().is_empty());
}

#[tokio::test]
async fn test_ingest_raw_snapshot() {
    let dir = TempDir::new().unwrap();
    let src_dir = TempDir::new().unwrap();
    let csv = src_dir.path().join("inspections.csv");
    std::fs::write(&csv, "serial_number,score\nPR1,90\nPR2,85\n").unwrap();

    let store = store(&dir);
    let db = DuckDbBackend::in_memory().unwrap();
    let stage = StageName::new("raw_inspections");

    let path = store
        .ingest_raw(&db, &stage, &RunId::new("r1"), &csv)
        .await
        .unwrap();
    assert_eq!(db.count_rows(&path).await.unwrap(), 2);

    let again = store.ingest_raw(&db, &stage, &RunId::new("r1"), &csv).await;
    assert!(matches!(again, Err(DbError::AlreadyExists { .. })));
}

#[tokio::test]
async fn test_ingest_into_non_raw_stage_refused() {
    let dir = TempDir::new().unwrap();
    let src_dir = TempDir::new().unwrap();
    let csv = src_dir.path().join("x.csv");
    std::fs::write(&csv, "a\n1\n").unwrap();

    let store = store(&dir);
    let db = DuckDbBackend::in_memory().unwrap();
    let result = store
        .ingest_raw(&db, &StageName::new("stg_inspections"), &RunId::new("r1"), &csv)
        .await;
    assert!(matches!(result, Err(DbError::NotRawStage { .. })));
}

#[test]
fn test_runs_of_unknown_stage_is_empty() {
    let dir = TempDir::new().unwrap();
    assert!(store(&dir).runs("nothing").unwrap().is_empty());
}

#[tokio::test]
async fn test_publish_file_keeps_column_types() {
    let dir = TempDir::new().unwrap();
    let src_dir = TempDir::new().unwrap();
    let source = src_dir.path().join("stg.parquet");
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(&format!(
        "COPY (SELECT DATE '2024-03-01' AS activity_date, \
         CAST(12.345 AS DECIMAL(10, 3)) AS amount) TO '{}' (FORMAT PARQUET)",
        source.display()
    ))
    .await
    .unwrap();

    let store = store(&dir);
    let id = DatasetId::new(StageName::new("stg_inspections"), RunId::new("r1"));
    let path = store.publish_file(&db, &id, &source).await.unwrap();
    assert_eq!(path, store.path_for(&id));

    let types: Vec<_> = db
        .describe(&path)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.data_type)
        .collect();
    assert_eq!(
        types,
        vec![Some(ColumnType::Date), Some(ColumnType::Decimal)]
    );

    let again = store.publish_file(&db, &id, &source).await;
    assert!(matches!(again, Err(DbError::AlreadyExists { .. })));
}

#[tokio::test]
async fn test_publish_file_refuses_raw_zone() {
    let dir = TempDir::new().unwrap();
    let src_dir = TempDir::new().unwrap();
    let csv = src_dir.path().join("x.csv");
    std::fs::write(&csv, "a\n1\n").unwrap();

    let store = store(&dir);
    let db = DuckDbBackend::in_memory().unwrap();
    let id = DatasetId::new(StageName::new("raw_inspections"), RunId::new("r1"));
    let result = store.publish_file(&db, &id, &csv).await;
    assert!(matches!(result, Err(DbError::RawZoneWrite { .. })));
}
