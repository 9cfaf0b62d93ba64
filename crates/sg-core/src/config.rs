//! Configuration types and parsing for stagegate.yml

use crate::dag::StageDag;
use crate::error::{CoreError, CoreResult};
use crate::names::StageName;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Main project configuration from stagegate.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Root directory of the dataset store
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Directory for run ledgers (reports, raw fingerprints)
    #[serde(default = "default_target_path")]
    pub target_path: String,

    /// Directories containing stage contract files
    #[serde(default = "default_contract_paths")]
    pub contract_paths: Vec<String>,

    /// Stages that form the append-only raw zone
    #[serde(default)]
    pub raw_stages: Vec<StageName>,

    /// Gated stages and their upstream stages
    #[serde(default)]
    pub stages: Vec<StageConfig>,

    /// Nearest-match settings
    #[serde(default)]
    pub geo: GeoConfig,
}

/// One gated stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageConfig {
    /// Stage name (matches the contract's `stage`)
    pub name: StageName,

    /// Stages whose passed reports this stage requires in the same run
    #[serde(default)]
    pub upstream: Vec<StageName>,

    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
}

/// Nearest-match settings. Distances always use the fixed 6371 km sphere.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeoConfig {
    /// Distances closer than this are treated as ties
    #[serde(default = "default_tie_epsilon_km")]
    pub tie_epsilon_km: f64,

    /// Number of worker threads for the subject scan
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            tie_epsilon_km: default_tie_epsilon_km(),
            workers: default_workers(),
        }
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_target_path() -> String {
    "target".to_string()
}

fn default_contract_paths() -> Vec<String> {
    vec!["contracts".to_string()]
}

fn default_tie_epsilon_km() -> f64 {
    1e-6
}

fn default_workers() -> usize {
    1
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for stagegate.yml or stagegate.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("stagegate.yml");
        let yaml_path = dir.join("stagegate.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        let geo = &self.geo;
        if !geo.tie_epsilon_km.is_finite() || geo.tie_epsilon_km < 0.0 {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "geo.tie_epsilon_km must be a non-negative number, got {}",
                    geo.tie_epsilon_km
                ),
            });
        }
        if geo.workers == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "geo.workers must be at least 1".to_string(),
            });
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for name in self
            .raw_stages
            .iter()
            .chain(self.stages.iter().map(|s| &s.name))
        {
            if !seen.insert(name.as_str()) {
                return Err(CoreError::DuplicateStage {
                    name: name.to_string(),
                });
            }
        }

        for stage in &self.stages {
            for upstream in &stage.upstream {
                if !seen.contains(upstream.as_str()) {
                    return Err(CoreError::UnknownStage {
                        name: upstream.to_string(),
                        context: format!("upstream of stage '{}'", stage.name),
                    });
                }
            }
        }

        StageDag::from_config(self)?;
        Ok(())
    }

    /// Absolute dataset store root
    pub fn data_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.data_dir)
    }

    /// Absolute ledger root
    pub fn target_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.target_path)
    }

    /// Absolute contract directories
    pub fn contract_paths_absolute(&self, root: &Path) -> Vec<PathBuf> {
        self.contract_paths.iter().map(|p| root.join(p)).collect()
    }

    /// Look up a gated stage
    pub fn stage(&self, name: &str) -> Option<&StageConfig> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Whether a stage belongs to the raw zone
    pub fn is_raw_stage(&self, name: &str) -> bool {
        self.raw_stages.iter().any(|s| s == name)
    }

    /// Upstream stages of a gated stage (empty for undeclared stages)
    pub fn upstream_of(&self, name: &str) -> &[StageName] {
        self.stage(name).map(|s| s.upstream.as_slice()).unwrap_or(&[])
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
