//! The validation gate
//!
//! A gate checks one dataset against one contract and returns a
//! [`ValidationReport`]. It never stops at the first failure: every rule is
//! evaluated and every violation is collected, so a single run shows the
//! full picture. Whether a dataset may be published is decided solely by
//! [`ValidationReport::passed`].

use crate::checks::{evaluate, EvalContext, Findings};
use crate::report::{RuleKind, ValidationReport, Violation, Warning};
use sg_core::{Contract, Dataset, RawCheck};

/// Gate configured for one contract
#[derive(Debug, Clone)]
pub struct ValidationGate<'c> {
    contract: &'c Contract,
    input_row_count: Option<usize>,
    raw_checks: Vec<RawCheck>,
}

impl<'c> ValidationGate<'c> {
    /// Create a gate for a contract
    pub fn new(contract: &'c Contract) -> Self {
        Self {
            contract,
            input_row_count: None,
            raw_checks: Vec::new(),
        }
    }

    /// Row count of the stage input, for the row count relation
    pub fn with_input_row_count(mut self, rows: usize) -> Self {
        self.input_row_count = Some(rows);
        self
    }

    /// Optional form of [`with_input_row_count`](Self::with_input_row_count)
    pub fn with_optional_input_row_count(mut self, rows: Option<usize>) -> Self {
        self.input_row_count = rows;
        self
    }

    /// Raw input fingerprint checks taken for this stage; mutations fail the gate
    pub fn with_raw_checks(mut self, checks: Vec<RawCheck>) -> Self {
        self.raw_checks = checks;
        self
    }

    /// Contract this gate enforces
    pub fn contract(&self) -> &Contract {
        self.contract
    }

    /// Check a dataset. Never fails: problems are reported, not raised.
    pub fn run(&self, dataset: &Dataset) -> ValidationReport {
        let rules = self.contract.rules();
        let ctx = EvalContext {
            dataset,
            input_rows: self.input_row_count,
        };
        let mut findings = Findings::default();

        if dataset.id().stage != self.contract.stage {
            findings.warnings.push(Warning {
                column: None,
                detail: format!(
                    "dataset stage '{}' is checked against contract for '{}'",
                    dataset.id().stage,
                    self.contract.stage
                ),
            });
        }

        for rule in &rules {
            let before = findings.violations.len();
            evaluate(rule, &ctx, &mut findings);
            log::debug!(
                "{}: {} -> {} violation(s)",
                dataset.id(),
                rule.label(),
                findings.violations.len() - before
            );
        }

        for check in &self.raw_checks {
            if let RawCheck::Mutated {
                path,
                expected,
                actual,
            } = check
            {
                findings.violations.push(Violation {
                    rule: RuleKind::ImmutabilityViolation,
                    column: None,
                    detail: format!(
                        "raw input {} changed during the run (expected sha256 {}, found {})",
                        path, expected, actual
                    ),
                    count: 1,
                });
            }
        }

        let report = ValidationReport::new(
            dataset.id().clone(),
            findings.violations,
            findings.warnings,
            self.input_row_count,
            dataset.len(),
            rules.len(),
        );

        if report.passed() {
            log::info!("{}", report.summary());
        } else {
            log::warn!("{}", report.summary());
        }
        report
    }
}

/// Validate a dataset against a contract, given the stage's input row count
pub fn validate(dataset: &Dataset, contract: &Contract, input_row_count: usize) -> ValidationReport {
    ValidationGate::new(contract)
        .with_input_row_count(input_row_count)
        .run(dataset)
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
