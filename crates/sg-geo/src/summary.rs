//! Run summary written next to the match output

use crate::haversine::EARTH_RADIUS_KM;
use crate::location::SkipReason;
use crate::matcher::{GeoMatcher, MatchOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counts describing one matching run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoSummary {
    pub references: usize,
    pub subjects: usize,
    pub matched: usize,
    pub skipped: usize,
    pub skipped_by_reason: BTreeMap<SkipReason, usize>,
    pub earth_radius_km: f64,
    pub tie_epsilon_km: f64,
    pub generated_at: DateTime<Utc>,
}

impl GeoSummary {
    /// Summarize an outcome produced by `matcher` over `subjects` inputs
    pub fn new(matcher: &GeoMatcher, subjects: usize, outcome: &MatchOutcome) -> Self {
        Self {
            references: matcher.references().len(),
            subjects,
            matched: outcome.matches.len(),
            skipped: outcome.skipped_count,
            skipped_by_reason: outcome.skipped_by_reason.clone(),
            earth_radius_km: EARTH_RADIUS_KM,
            tie_epsilon_km: matcher.options().tie_epsilon_km,
            generated_at: Utc::now(),
        }
    }

    /// Every subject is accounted for exactly once
    pub fn is_balanced(&self) -> bool {
        self.matched + self.skipped == self.subjects
    }
}
