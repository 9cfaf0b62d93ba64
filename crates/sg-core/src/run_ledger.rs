//! Per-run ledger of validation reports and raw input fingerprints
//!
//! Every gate invocation leaves its report here, passed or failed, under
//! `<target>/runs/<run_id>/<stage>.report.json`. Downstream stages read the
//! reports of their upstreams before doing anything, which is what makes a
//! failed report block all later writes in the same run.

use crate::checksum::compute_file_checksum;
use crate::error::{CoreError, CoreResult};
use crate::names::{RunId, StageName};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const REPORT_SUFFIX: &str = ".report.json";
const RAW_CHECKSUMS_FILE: &str = "raw_checksums.json";

/// Fingerprint of one raw input file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFingerprint {
    /// SHA-256 of the file contents
    pub checksum: String,
    /// When the fingerprint was first taken
    pub recorded_at: DateTime<Utc>,
}

/// Outcome of comparing a raw input against its recorded fingerprint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawCheck {
    /// First sighting in this run; fingerprint stored
    Recorded { path: String, checksum: String },
    /// Contents match the stored fingerprint
    Unchanged { path: String, checksum: String },
    /// Contents changed since the fingerprint was taken
    Mutated {
        path: String,
        expected: String,
        actual: String,
    },
}

impl RawCheck {
    /// Whether the check found a mutation
    pub fn is_mutated(&self) -> bool {
        matches!(self, RawCheck::Mutated { .. })
    }
}

/// Ledger directory for one run
#[derive(Debug, Clone)]
pub struct RunLedger {
    run_id: RunId,
    dir: PathBuf,
}

impl RunLedger {
    /// Open (without creating) the ledger of a run under a target directory
    pub fn open(target_dir: &Path, run_id: RunId) -> Self {
        let dir = target_dir.join("runs").join(run_id.as_str());
        Self { run_id, dir }
    }

    /// Run this ledger belongs to
    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Ledger directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a stage's report
    pub fn report_path(&self, stage: &str) -> PathBuf {
        self.dir.join(format!("{}{}", stage, REPORT_SUFFIX))
    }

    /// Persist a stage report atomically, replacing any earlier attempt
    pub fn save_report<T: Serialize>(&self, stage: &StageName, report: &T) -> CoreResult<PathBuf> {
        let path = self.report_path(stage);
        write_atomic(&path, &serde_json::to_string_pretty(report)?)?;
        log::debug!("Saved report for {} to {}", stage, path.display());
        Ok(path)
    }

    /// Load a stage report if one exists
    pub fn load_report<T: DeserializeOwned>(&self, stage: &str) -> CoreResult<Option<T>> {
        let path = self.report_path(stage);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Stages that have a report in this run, sorted
    pub fn reported_stages(&self) -> CoreResult<Vec<StageName>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut stages = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if let Some(stage) = name.strip_suffix(REPORT_SUFFIX).and_then(StageName::try_new) {
                stages.push(stage);
            }
        }
        stages.sort();
        Ok(stages)
    }

    /// Fingerprint a raw input, comparing against the fingerprint stored by an
    /// earlier stage of the same run.
    pub fn check_raw_input(&self, path: &Path) -> CoreResult<RawCheck> {
        let key = fs::canonicalize(path)
            .unwrap_or_else(|_| path.to_path_buf())
            .display()
            .to_string();
        let actual = compute_file_checksum(path)?;

        let mut fingerprints = self.load_raw_fingerprints()?;
        match fingerprints.get(&key) {
            Some(recorded) if recorded.checksum == actual => Ok(RawCheck::Unchanged {
                path: key,
                checksum: actual,
            }),
            Some(recorded) => {
                log::warn!("Raw input {} changed during run {}", key, self.run_id);
                Ok(RawCheck::Mutated {
                    path: key,
                    expected: recorded.checksum.clone(),
                    actual,
                })
            }
            None => {
                fingerprints.insert(
                    key.clone(),
                    RawFingerprint {
                        checksum: actual.clone(),
                        recorded_at: Utc::now(),
                    },
                );
                write_atomic(
                    &self.dir.join(RAW_CHECKSUMS_FILE),
                    &serde_json::to_string_pretty(&fingerprints)?,
                )?;
                Ok(RawCheck::Recorded {
                    path: key,
                    checksum: actual,
                })
            }
        }
    }

    fn load_raw_fingerprints(&self) -> CoreResult<BTreeMap<String, RawFingerprint>> {
        let path = self.dir.join(RAW_CHECKSUMS_FILE);
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Write to a temporary sibling, then rename over the target
fn write_atomic(path: &Path, content: &str) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
#[path = "run_ledger_test.rs"]
mod tests;
