//! Stage contracts
//!
//! A contract is the declarative set of invariants a dataset must satisfy at
//! one stage boundary. It is attached to a stage, not to a dataset instance,
//! and is loaded from `contracts/<stage>.yml`.

use crate::column_type::ColumnType;
use crate::error::{CoreError, CoreResult};
use crate::names::StageName;
use crate::rules::Rule;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// How a stage's output row count must relate to its input row count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowCountRelation {
    /// Exactly as many rows out as in (1:1 transforms)
    EqualToInput,
    /// No more rows out than in (filters)
    LteInput,
    /// No check (joins, aggregations)
    #[default]
    Any,
}

impl fmt::Display for RowCountRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowCountRelation::EqualToInput => write!(f, "equal_to_input"),
            RowCountRelation::LteInput => write!(f, "lte_input"),
            RowCountRelation::Any => write!(f, "any"),
        }
    }
}

/// Inclusive numeric bounds; either side may be open
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValueRange {
    /// Lower bound (inclusive)
    #[serde(default)]
    pub min: Option<f64>,
    /// Upper bound (inclusive)
    #[serde(default)]
    pub max: Option<f64>,
}

impl ValueRange {
    /// Whether `x` lies within the bounds. NaN never does.
    pub fn contains(&self, x: f64) -> bool {
        if x.is_nan() {
            return false;
        }
        self.min.map_or(true, |min| x >= min) && self.max.map_or(true, |max| x <= max)
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (Some(min), Some(max)) => write!(f, "[{}, {}]", min, max),
            (Some(min), None) => write!(f, "[{}, +inf)", min),
            (None, Some(max)) => write!(f, "(-inf, {}]", max),
            (None, None) => write!(f, "(-inf, +inf)"),
        }
    }
}

/// A stage contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Contract {
    /// Stage this contract is attached to
    pub stage: StageName,

    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Columns that must be present
    #[serde(default)]
    pub required_columns: BTreeSet<String>,

    /// Expected type per column
    #[serde(default)]
    pub column_types: BTreeMap<String, ColumnType>,

    /// Maximum null fraction per column, in [0, 1]
    #[serde(default)]
    pub allowed_null_rate: BTreeMap<String, f64>,

    /// Column sets whose value tuples must be unique
    #[serde(default)]
    pub uniqueness_keys: Vec<Vec<String>>,

    /// Output/input row count relation
    #[serde(default)]
    pub expected_row_count_relation: RowCountRelation,

    /// Inclusive numeric bounds per column
    #[serde(default)]
    pub value_ranges: BTreeMap<String, ValueRange>,

    /// Minimum number of rows
    #[serde(default)]
    pub min_rows: Option<usize>,

    /// Columns that must hold non-blank values in every row
    #[serde(default)]
    pub not_blank: BTreeSet<String>,
}

impl Contract {
    /// An empty contract for a stage: every dataset passes it
    pub fn new(stage: StageName) -> Self {
        Self {
            stage,
            description: None,
            required_columns: BTreeSet::new(),
            column_types: BTreeMap::new(),
            allowed_null_rate: BTreeMap::new(),
            uniqueness_keys: Vec::new(),
            expected_row_count_relation: RowCountRelation::Any,
            value_ranges: BTreeMap::new(),
            min_rows: None,
            not_blank: BTreeSet::new(),
        }
    }

    /// Require a column, optionally with a type
    pub fn require(mut self, column: &str, data_type: Option<&str>) -> Self {
        self.required_columns.insert(column.to_string());
        if let Some(t) = data_type {
            self.column_types
                .insert(column.to_string(), ColumnType::parse(t));
        }
        self
    }

    /// Set a null-rate budget for a column
    pub fn null_rate(mut self, column: &str, max_rate: f64) -> Self {
        self.allowed_null_rate.insert(column.to_string(), max_rate);
        self
    }

    /// Add a uniqueness key
    pub fn unique(mut self, columns: &[&str]) -> Self {
        self.uniqueness_keys
            .push(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    /// Set the row count relation
    pub fn row_count(mut self, relation: RowCountRelation) -> Self {
        self.expected_row_count_relation = relation;
        self
    }

    /// Add an inclusive range for a column
    pub fn range(mut self, column: &str, min: Option<f64>, max: Option<f64>) -> Self {
        self.value_ranges
            .insert(column.to_string(), ValueRange { min, max });
        self
    }

    /// Parse a contract from YAML and check it
    pub fn from_yaml(content: &str) -> CoreResult<Self> {
        let contract: Contract = serde_yaml::from_str(content)?;
        contract.validate()?;
        Ok(contract)
    }

    /// Load a contract from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml(&content)
    }

    /// Check the contract is internally consistent
    pub fn validate(&self) -> CoreResult<()> {
        let invalid = |message: String| CoreError::ContractInvalid {
            stage: self.stage.to_string(),
            message,
        };

        for (column, rate) in &self.allowed_null_rate {
            if !rate.is_finite() || !(0.0..=1.0).contains(rate) {
                return Err(invalid(format!(
                    "allowed_null_rate for '{}' must be within [0, 1], got {}",
                    column, rate
                )));
            }
        }

        for (i, key) in self.uniqueness_keys.iter().enumerate() {
            if key.is_empty() {
                return Err(invalid(format!("uniqueness key #{} has no columns", i + 1)));
            }
            if key.iter().any(|c| c.trim().is_empty()) {
                return Err(invalid(format!(
                    "uniqueness key #{} contains an empty column name",
                    i + 1
                )));
            }
        }

        for (column, range) in &self.value_ranges {
            if range.min.is_some_and(f64::is_nan) || range.max.is_some_and(f64::is_nan) {
                return Err(invalid(format!("value range for '{}' has a NaN bound", column)));
            }
            if let (Some(min), Some(max)) = (range.min, range.max) {
                if min > max {
                    return Err(invalid(format!(
                        "value range for '{}' has min {} greater than max {}",
                        column, min, max
                    )));
                }
            }
        }

        let named = self
            .required_columns
            .iter()
            .chain(self.column_types.keys())
            .chain(self.allowed_null_rate.keys())
            .chain(self.value_ranges.keys())
            .chain(self.not_blank.iter());
        for column in named {
            if column.trim().is_empty() {
                return Err(invalid("empty column name".to_string()));
            }
        }

        Ok(())
    }

    /// Uniqueness keys with columns sorted and duplicate key-sets removed
    pub fn normalized_keys(&self) -> Vec<Vec<String>> {
        let keys: BTreeSet<Vec<String>> = self
            .uniqueness_keys
            .iter()
            .map(|key| {
                let set: BTreeSet<&String> = key.iter().collect();
                set.into_iter().cloned().collect()
            })
            .collect();
        keys.into_iter().collect()
    }

    /// Every column the contract mentions
    pub fn declared_columns(&self) -> BTreeSet<String> {
        let mut declared: BTreeSet<String> = self.required_columns.clone();
        declared.extend(self.column_types.keys().cloned());
        declared.extend(self.allowed_null_rate.keys().cloned());
        declared.extend(self.value_ranges.keys().cloned());
        declared.extend(self.not_blank.iter().cloned());
        declared.extend(self.uniqueness_keys.iter().flatten().cloned());
        declared
    }

    /// Compile the contract into its ordered rule set
    pub fn rules(&self) -> Vec<Rule> {
        let mut rules = Vec::new();

        for column in &self.required_columns {
            rules.push(Rule::RequiredColumn {
                column: column.clone(),
            });
        }
        for (column, expected) in &self.column_types {
            rules.push(Rule::ColumnType {
                column: column.clone(),
                expected: expected.clone(),
            });
        }
        for (column, max_rate) in &self.allowed_null_rate {
            rules.push(Rule::NullRate {
                column: column.clone(),
                max_rate: *max_rate,
            });
        }
        for column in &self.not_blank {
            rules.push(Rule::NotBlank {
                column: column.clone(),
            });
        }
        for columns in self.normalized_keys() {
            rules.push(Rule::Unique { columns });
        }
        for (column, range) in &self.value_ranges {
            rules.push(Rule::ValueRange {
                column: column.clone(),
                range: *range,
            });
        }
        if let Some(min) = self.min_rows {
            rules.push(Rule::MinRows { min });
        }
        rules.push(Rule::RowCount {
            relation: self.expected_row_count_relation,
        });
        rules.push(Rule::UnexpectedColumns {
            declared: self.declared_columns(),
        });

        rules
    }
}

/// Load every contract under the given directories (`*.yml`, `*.yaml`).
///
/// Directories that do not exist are skipped. Two files declaring the same
/// stage is an error.
pub fn load_contracts(dirs: &[PathBuf]) -> CoreResult<BTreeMap<StageName, Contract>> {
    let mut contracts: BTreeMap<StageName, Contract> = BTreeMap::new();
    let mut origins: BTreeMap<StageName, PathBuf> = BTreeMap::new();

    for dir in dirs {
        if !dir.is_dir() {
            log::debug!("Contract directory {} not found, skipping", dir.display());
            continue;
        }

        let mut paths: Vec<PathBuf> = Vec::new();
        for ext in ["yml", "yaml"] {
            let pattern = dir.join(format!("*.{}", ext));
            for entry in glob::glob(&pattern.to_string_lossy())? {
                match entry {
                    Ok(path) => paths.push(path),
                    Err(e) => log::warn!("Cannot read contract entry: {}", e),
                }
            }
        }
        paths.sort();

        for path in paths {
            let contract = Contract::load(&path).map_err(|e| match e {
                CoreError::YamlParse(err) => CoreError::ContractInvalid {
                    stage: path.display().to_string(),
                    message: err.to_string(),
                },
                other => other,
            })?;
            if let Some(first) = origins.get(&contract.stage) {
                return Err(CoreError::DuplicateContract {
                    stage: contract.stage.to_string(),
                    path1: first.display().to_string(),
                    path2: path.display().to_string(),
                });
            }
            origins.insert(contract.stage.clone(), path);
            contracts.insert(contract.stage.clone(), contract);
        }
    }

    Ok(contracts)
}

#[cfg(test)]
#[path = "contract_test.rs"]
mod tests;
