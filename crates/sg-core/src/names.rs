//! Strongly-typed stage names, run ids and dataset identity.

use crate::newtype_string::define_newtype_string;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

define_newtype_string! {
    /// A non-empty pipeline stage name (e.g. `stg_inspections`).
    pub struct StageName;
}

define_newtype_string! {
    /// A non-empty run identifier.
    ///
    /// Passed explicitly to every stage invocation; there is no global run
    /// registry.
    pub struct RunId;
}

impl RunId {
    /// Generate a fresh short run id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string()[..8].to_string())
    }
}

/// Identity of one dataset: the stage that produced it and the run it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DatasetId {
    /// Producing stage
    pub stage: StageName,
    /// Run the dataset was produced in
    pub run_id: RunId,
}

impl DatasetId {
    /// Create a dataset id
    pub fn new(stage: StageName, run_id: RunId) -> Self {
        Self { stage, run_id }
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.stage, self.run_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_name_creation() {
        let name = StageName::new("stg_inspections");
        assert_eq!(name.as_str(), "stg_inspections");
        assert_eq!(name, "stg_inspections");
    }

    #[test]
    fn test_stage_name_rejects_empty() {
        assert!(StageName::try_new("").is_none());
        assert!(StageName::try_from("").is_err());
        let parsed: Result<StageName, _> = serde_json::from_str(r#""""#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_names_must_be_path_components() {
        assert!(RunId::try_new("../etc").is_none());
        assert!(RunId::try_new("a\\b").is_none());
        assert!(StageName::try_new(" stg").is_none());
        assert!(StageName::try_new("..").is_none());
        let err = StageName::try_from("a/b").unwrap_err();
        assert!(err.contains("path separators"));
    }

    #[test]
    fn test_stage_name_serde_transparent() {
        let name = StageName::new("core_facility");
        assert_eq!(serde_json::to_string(&name).unwrap(), r#""core_facility""#);
    }

    #[test]
    fn test_run_id_generate_is_short_and_unique() {
        let a = RunId::generate();
        let b = RunId::generate();
        assert_eq!(a.len(), 8);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_dataset_id_display() {
        let id = DatasetId::new(StageName::new("mart_near_me"), RunId::new("r1"));
        assert_eq!(id.to_string(), "mart_near_me@r1");
    }

    #[test]
    fn test_borrow_lookup() {
        use std::collections::HashMap;
        let mut map: HashMap<StageName, i32> = HashMap::new();
        map.insert(StageName::new("a"), 1);
        assert_eq!(map.get("a"), Some(&1));
    }
}
