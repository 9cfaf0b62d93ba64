//! Write-once dataset store
//!
//! Datasets live at `<root>/<stage>/<run_id>.parquet`. A path is written at
//! most once: a newer dataset for the same stage gets a new run id. Stages
//! marked raw form the raw zone; stage outputs may not be written there, and
//! raw snapshots enter only through [`DatasetStore::ingest_raw`].

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use sg_core::{Config, Dataset, DatasetId, RunId, StageName};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

const DATASET_EXTENSION: &str = "parquet";

/// Filesystem-backed store of immutable datasets
#[derive(Debug, Clone)]
pub struct DatasetStore {
    root: PathBuf,
    raw_stages: BTreeSet<StageName>,
}

impl DatasetStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>, raw_stages: impl IntoIterator<Item = StageName>) -> Self {
        Self {
            root: root.into(),
            raw_stages: raw_stages.into_iter().collect(),
        }
    }

    /// Store for a project, rooted at its data directory
    pub fn from_config(config: &Config, project_root: &Path) -> Self {
        Self::new(
            config.data_dir_absolute(project_root),
            config.raw_stages.iter().cloned(),
        )
    }

    /// Store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether a stage belongs to the raw zone
    pub fn is_raw(&self, stage: &str) -> bool {
        self.raw_stages.iter().any(|s| s == stage)
    }

    /// Location of a dataset
    pub fn path_for(&self, id: &DatasetId) -> PathBuf {
        self.root
            .join(id.stage.as_str())
            .join(format!("{}.{}", id.run_id, DATASET_EXTENSION))
    }

    /// Whether a dataset has been written
    pub fn exists(&self, id: &DatasetId) -> bool {
        self.path_for(id).exists()
    }

    /// Run ids with a dataset for a stage, sorted
    pub fn runs(&self, stage: &str) -> DbResult<Vec<RunId>> {
        let dir = self.root.join(stage);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut runs = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == DATASET_EXTENSION) {
                if let Some(run) = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(RunId::try_new)
                {
                    runs.push(run);
                }
            }
        }
        runs.sort();
        Ok(runs)
    }

    /// Write an in-memory stage output. Refuses the raw zone and existing paths.
    pub async fn write(&self, db: &dyn Database, dataset: &Dataset) -> DbResult<PathBuf> {
        let id = dataset.id();
        let path = self.claim_stage_output(id)?;
        let temp = temp_path(&path);
        db.write_parquet(dataset, &temp).await?;
        publish(&temp, &path)?;

        log::info!("Wrote {} ({} rows) to {}", id, dataset.len(), path.display());
        Ok(path)
    }

    /// Publish a validated stage output file as-is, keeping its column types.
    /// Refuses the raw zone and existing paths.
    pub async fn publish_file(
        &self,
        db: &dyn Database,
        id: &DatasetId,
        source: &Path,
    ) -> DbResult<PathBuf> {
        let path = self.claim_stage_output(id)?;
        let temp = temp_path(&path);
        db.copy_to_parquet(source, &temp).await?;
        publish(&temp, &path)?;

        log::info!("Published {} as {}", source.display(), id);
        Ok(path)
    }

    /// Snapshot a raw input file into the raw zone under a new run id
    pub async fn ingest_raw(
        &self,
        db: &dyn Database,
        stage: &StageName,
        run_id: &RunId,
        source: &Path,
    ) -> DbResult<PathBuf> {
        if !self.is_raw(stage) {
            return Err(DbError::NotRawStage {
                stage: stage.to_string(),
            });
        }
        let id = DatasetId::new(stage.clone(), run_id.clone());
        let path = self.claim(&id)?;
        let temp = temp_path(&path);
        db.copy_to_parquet(source, &temp).await?;
        publish(&temp, &path)?;

        log::info!("Ingested {} as {}", source.display(), id);
        Ok(path)
    }

    fn claim_stage_output(&self, id: &DatasetId) -> DbResult<PathBuf> {
        if self.is_raw(&id.stage) {
            return Err(DbError::RawZoneWrite {
                stage: id.stage.to_string(),
            });
        }
        self.claim(id)
    }

    fn claim(&self, id: &DatasetId) -> DbResult<PathBuf> {
        let path = self.path_for(id);
        if path.exists() {
            return Err(DbError::AlreadyExists {
                path: path.display().to_string(),
            });
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(path)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    path.with_extension(format!("{}.tmp", DATASET_EXTENSION))
}

/// Move a finished temp file into place without clobbering a concurrent writer
fn publish(temp: &Path, path: &Path) -> DbResult<()> {
    if path.exists() {
        let _ = fs::remove_file(temp);
        return Err(DbError::AlreadyExists {
            path: path.display().to_string(),
        });
    }
    fs::rename(temp, path)?;
    Ok(())
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
