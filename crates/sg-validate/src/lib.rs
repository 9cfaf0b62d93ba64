//! sg-validate - Validation gate for Stagegate
//!
//! Interprets the rule set compiled from a stage contract against a dataset
//! and produces a [`ValidationReport`] listing every violation found.

mod checks;
pub mod gate;
pub mod report;

pub use gate::{validate, ValidationGate};
pub use report::{RuleKind, ValidationReport, Violation, Warning};
