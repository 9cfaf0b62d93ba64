//! Project context shared by commands

use anyhow::{Context, Result};
use sg_core::{load_contracts, Config, Contract, CoreError, RunId, RunLedger, StageName};
use sg_db::{Database, DatasetStore, DuckDbBackend};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Loaded project: configuration, contracts and a database handle
pub(crate) struct ProjectContext {
    pub root: PathBuf,
    pub config: Config,
    pub contracts: BTreeMap<StageName, Contract>,
    pub db: Arc<dyn Database>,
}

impl ProjectContext {
    /// Load the project named by the global arguments
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let root = PathBuf::from(&global.project_dir);

        let config = match &global.config {
            Some(path) => {
                Config::load(Path::new(path)).context("Failed to load configuration file")?
            }
            None => Config::load_from_dir(&root).context("Failed to load project configuration")?,
        };

        let contracts = load_contracts(&config.contract_paths_absolute(&root))
            .context("Failed to load contracts")?;
        log::debug!("Loaded {} contract(s)", contracts.len());

        let db: Arc<dyn Database> =
            Arc::new(DuckDbBackend::in_memory().context("Failed to open DuckDB")?);

        Ok(Self {
            root,
            config,
            contracts,
            db,
        })
    }

    /// Contract for a stage
    pub fn contract(&self, stage: &str) -> Result<&Contract, CoreError> {
        self.contracts
            .get(stage)
            .ok_or_else(|| CoreError::ContractNotFound {
                stage: stage.to_string(),
            })
    }

    /// Check that a stage is declared in the project
    pub fn stage_name(&self, stage: &str) -> Result<StageName, CoreError> {
        let known = self.config.stage(stage).is_some() || self.config.is_raw_stage(stage);
        match StageName::try_new(stage) {
            Some(name) if known => Ok(name),
            Some(_) => Err(CoreError::UnknownStage {
                name: stage.to_string(),
                context: "not declared in the project configuration".to_string(),
            }),
            None => Err(CoreError::InvalidName {
                context: "stage".to_string(),
            }),
        }
    }

    /// Ledger of a run
    pub fn ledger(&self, run_id: RunId) -> RunLedger {
        RunLedger::open(&self.config.target_path_absolute(&self.root), run_id)
    }

    /// Dataset store of the project
    pub fn store(&self) -> DatasetStore {
        DatasetStore::from_config(&self.config, &self.root)
    }
}
